use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    /// A price cell that holds neither one nor three amounts.
    PriceParse(String),
    /// The extraction logic itself broke one of its own guarantees.
    Invariant(String),
    Internal(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceParse(msg) => write!(f, "Price Parse Error: {msg}"),
            Self::Invariant(msg) => write!(f, "Invariant Violation: {msg}"),
            Self::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
