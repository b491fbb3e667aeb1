use std::fmt::{self, Display, Formatter};

use crate::{catalog, fetch, parse};

#[derive(Debug)]
pub enum Error {
    Parse(parse::Error),
    Fetch(fetch::Error),
    Catalog(catalog::Error),
    Io(std::io::Error),
    Xml(quick_xml::Error),
}

impl From<parse::Error> for Error {
    fn from(e: parse::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<fetch::Error> for Error {
    fn from(e: fetch::Error) -> Self {
        Self::Fetch(e)
    }
}

impl From<catalog::Error> for Error {
    fn from(e: catalog::Error) -> Self {
        Self::Catalog(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Catalog(e) => write!(f, "Catalog error: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Xml(e) => write!(f, "XML error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
