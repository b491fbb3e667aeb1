use chrono::NaiveDate;
use scraper::{ElementRef, Html};

use super::meal::Category;
use super::price::PriceMode;
use crate::parse::text_from_selection::inner_text;
use crate::static_selector;

/// Both spellings show up upstream.
static NO_OFFER: [&str; 2] = ["Kein Speisenangebot", "Kein Speiseangebot"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,
    pub categories: Vec<Category>,
}

impl Day {
    pub const fn closed(date: NaiveDate) -> Self {
        Self {
            date,
            categories: vec![],
        }
    }

    /// A day without a single meal, this includes a day without categories.
    pub fn is_closed(&self) -> bool {
        self.categories.iter().all(Category::is_empty)
    }

    pub fn from_html(html: &Html, date: NaiveDate, price_mode: PriceMode, id: &str) -> Self {
        Self::from_html_element(html.root_element(), date, price_mode, id)
    }

    pub fn from_html_element(
        element: ElementRef<'_>,
        date: NaiveDate,
        price_mode: PriceMode,
        id: &str,
    ) -> Self {
        static_selector!(CATEGORY_SELECTOR <- "div.splGroupWrapper");

        let wrappers: Vec<ElementRef> = element.select(&CATEGORY_SELECTOR).collect();
        if let [wrapper] = wrappers.as_slice() {
            if is_no_offer(*wrapper) {
                return Self::closed(date);
            }
        }

        let context = format!("{id}: {date}");
        let mut categories = Vec::with_capacity(wrappers.len());
        for (i, wrapper) in wrappers.into_iter().enumerate() {
            // only the first block ever carries the notice
            if i == 0 && is_no_offer(wrapper) {
                log::info!("{context}: kein Speiseangebot");
                break;
            }
            categories.push(Category::from_html_element(wrapper, price_mode, &context));
        }

        Self { date, categories }
    }
}

fn is_no_offer(wrapper: ElementRef<'_>) -> bool {
    static_selector!(NESTED_SELECTOR <- "div");
    wrapper.select(&NESTED_SELECTOR).next().is_none()
        && NO_OFFER.contains(&inner_text(wrapper).trim())
}
