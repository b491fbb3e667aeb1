use scraper::ElementRef;

use crate::parse::text_from_selection::text_from_selection;
use crate::{static_regex, static_selector};

/// Geolocation, kept with the precision the upstream prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub latitude: String,
    pub longitude: String,
}

impl Location {
    /// Looks for the map initialisation in the inline scripts of the page.
    pub fn from_html_element(element: ElementRef<'_>) -> Option<Self> {
        static_selector!(SCRIPT_SELECTOR <- "script");
        static_regex!(COORDINATES_RE <- r"fromLonLat\(\[\s*(?P<longitude>-?\d+\.\d+),\s*(?P<latitude>-?\d+\.\d+)");
        let scripts = text_from_selection(&SCRIPT_SELECTOR, element);
        let caps = COORDINATES_RE.captures(&scripts)?;
        Some(Self {
            latitude: caps["latitude"].to_owned(),
            longitude: caps["longitude"].to_owned(),
        })
    }
}
