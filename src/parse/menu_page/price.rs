use std::{fmt::Display, str::FromStr};

use crate::parse::error::Result;
use crate::parse::Error;
use crate::static_regex;

/// The consumer class a price applies to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    Student,
    Employee,
    Other,
}

impl Role {
    /// Roles in the order the upstream lists three prices.
    pub const POSITIONAL: [Self; 3] = [Self::Student, Self::Employee, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Employee => "employee",
            Self::Other => "other",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Price {
    /// Decimal amount with a dot separator, e.g. `3.50`.
    pub amount: String,
    pub role: Role,
}

impl Price {
    /// Takes an amount as printed upstream (`3,50`) and normalises the separator.
    pub fn new(amount: &str, role: Role) -> Self {
        Self {
            amount: amount.replacen(',', ".", 1),
            role,
        }
    }
}

/// Strategy used to read the prices of a meal from its price cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum PriceMode {
    /// Collect every `\d+,\d{2}` in the cell.
    #[default]
    Scan,
    /// Treat the cell as a single `student / employee / other` string.
    Slash,
}

impl FromStr for PriceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" | "regex" => Ok(Self::Scan),
            "slash" => Ok(Self::Slash),
            _ => Err(format!("Invalid price mode: {s}. Valid options: scan, slash")),
        }
    }
}

impl PriceMode {
    /// Reads the prices out of `text`. An unexpected shape is reported as
    /// [`Error::PriceParse`], the caller logs it and keeps the meal without prices.
    pub fn extract(self, text: &str) -> Result<Vec<Price>> {
        match self {
            Self::Scan => scan_prices(text),
            Self::Slash => Ok(split_prices(text)),
        }
    }
}

/// One amount is the guest price, three are student, employee and guest.
fn scan_prices(text: &str) -> Result<Vec<Price>> {
    static_regex!(PRICE_RE <- r"\d+,\d{2}");
    let amounts: Vec<&str> = PRICE_RE.find_iter(text).map(|m| m.as_str()).collect();
    match amounts.len() {
        // regularly the case for salad dressing and the like
        0 => Ok(vec![]),
        1 => Ok(vec![Price::new(amounts[0], Role::Other)]),
        3 => Ok(amounts
            .iter()
            .zip(Role::POSITIONAL)
            .map(|(amount, role)| Price::new(amount, role))
            .collect()),
        n => Err(Error::PriceParse(format!(
            "found {n} prices but expected 0, 1 or 3 within {text:?}"
        ))),
    }
}

/// Parts that do not look like an amount (`kostenlos`, `-`) carry no price.
fn split_prices(text: &str) -> Vec<Price> {
    static_regex!(AMOUNT_RE <- r"^\d+,\d{2}$");
    let parts: Vec<Option<&str>> = text
        .splitn(3, '/')
        .map(|part| part.trim().trim_matches('€').trim())
        .map(|part| AMOUNT_RE.is_match(part).then_some(part))
        .collect();
    match parts.as_slice() {
        [] | [None] => vec![],
        [Some(single)] => Role::POSITIONAL
            .iter()
            .map(|role| Price::new(single, *role))
            .collect(),
        parts => parts
            .iter()
            .zip(Role::POSITIONAL)
            .filter_map(|(amount, role)| amount.map(|amount| Price::new(amount, role)))
            .collect(),
    }
}
