use scraper::ElementRef;

use crate::parse::text_from_selection::inner_text;
use crate::static_selector;

/// One entry of the facility listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    pub id: String,
    pub name: String,
}

impl Facility {
    /// Every option of the facility listing, in page order.
    pub fn all_from_html_element(element: ElementRef<'_>) -> Vec<Self> {
        static_selector!(OPTION_SELECTOR <- "select#listboxEinrichtungen.listboxStandorte option[value]");
        element
            .select(&OPTION_SELECTOR)
            .filter_map(|option| {
                let id = option.value().attr("value")?;
                Some(Self {
                    id: id.to_owned(),
                    name: inner_text(option).trim().to_owned(),
                })
            })
            .collect()
    }

    /// Name of the entry the page was requested for.
    pub fn selected_name(element: ElementRef<'_>) -> Option<String> {
        static_selector!(SELECTED_SELECTOR <- "select#listboxEinrichtungen.listboxStandorte option[selected]");
        element
            .select(&SELECTED_SELECTOR)
            .next()
            .map(|option| inner_text(option).trim().to_owned())
            .filter(|name| !name.is_empty())
    }
}
