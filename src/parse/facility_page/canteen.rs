use scraper::{ElementRef, Html};

use super::facilities::Facility;
use super::location::Location;
use super::opening_hours::Times;
use crate::parse::error::Result;
use crate::parse::menu_page::Day;
use crate::parse::remove_excess_whitespace;
use crate::parse::text_from_selection::{
    first_text, inner_text, next_sibling_element, parent_element,
};
use crate::{static_regex, static_selector};

/// When and how often a feed consumer should fetch a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSchedule {
    pub hour: String,
    pub retry: Option<String>,
}

/// Pointer to a generated feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub name: String,
    pub schedule: Option<FeedSchedule>,
    pub url: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canteen {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub location: Option<Location>,
    pub times: Option<Times>,
    pub availability: Option<String>,
    pub feeds: Vec<Feed>,
    pub days: Vec<Day>,
}

/// Where to look for a canteen name the facility listing does not give.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    /// Standalone page of the canteen, named in its `<title>`.
    DirectLink(String),
    /// Embedded mensatogo widget, carries the canteen in a `mensa=` parameter.
    Iframe(String),
}

impl Canteen {
    /// Reads everything but days and feeds from a facility page. The name is left
    /// empty when the listing has none selected, see [`NameSource`].
    ///
    /// Fails only when the opening hours break their own invariants.
    pub fn from_facility_page(html: &Html, id: &str) -> Result<Self> {
        let element = html.root_element();
        static_selector!(MAP_MARKER_SELECTOR <- "i.glyphicon.glyphicon-map-marker");
        static_selector!(PHONE_SELECTOR <- "i.glyphicon.glyphicon-earphone");
        static_selector!(EMAIL_SELECTOR <- "i.glyphicon.glyphicon-envelope");

        let name = Facility::selected_name(element).unwrap_or_default();
        let address = text_next_to_icon(&MAP_MARKER_SELECTOR, element)
            .map(|raw| clean_address(&raw))
            .unwrap_or_default();
        let phone = text_next_to_icon(&PHONE_SELECTOR, element)
            .map(|x| single_line(&x))
            .unwrap_or_default();
        let email = text_next_to_icon(&EMAIL_SELECTOR, element)
            .map(|x| single_line(&x))
            .unwrap_or_default();

        let location = Location::from_html_element(element);
        if location.is_none() {
            log::warn!("{id}: {name}: did not find location coordinates");
        }
        let times = Times::from_html_element(element)?;
        if times.is_none() {
            log::debug!("{id}: {name}: no opening hours listed");
        }

        Ok(Self {
            name,
            address,
            phone,
            email,
            location,
            times,
            ..Self::default()
        })
    }
}

impl NameSource {
    pub fn from_facility_page(html: &Html) -> Option<Self> {
        static_selector!(IFRAME_SELECTOR <- "iframe[src]");
        if let Some(link) = direct_link(html) {
            return Some(Self::DirectLink(link));
        }
        html.root_element()
            .select(&IFRAME_SELECTOR)
            .next()
            .and_then(|iframe| iframe.value().attr("src"))
            .filter(|src| !src.is_empty())
            .map(|src| Self::Iframe(src.to_owned()))
    }
}

/// Link to the standalone page of the canteen, also published as the feed source.
pub fn direct_link(html: &Html) -> Option<String> {
    static_selector!(DIRECT_LINK_SELECTOR <- "div#directlink");
    first_text(&DIRECT_LINK_SELECTOR, html.root_element()).filter(|x| !x.is_empty())
}

/// Name from the `<title>` of a direct link page, with the site `prefix` removed.
pub fn name_from_title(html: &Html, prefix: &str) -> Option<String> {
    static_selector!(TITLE_SELECTOR <- "title");
    let title = first_text(&TITLE_SELECTOR, html.root_element())?;
    let name = title.strip_prefix(prefix).unwrap_or(&title).trim();
    (!name.is_empty()).then(|| name.to_owned())
}

/// The canteen number of a mensatogo widget url.
pub fn mensatogo_id(url: &str) -> Option<&str> {
    static_regex!(MENSA_RE <- r"mensa=(\d+)");
    MENSA_RE.captures(url)?.get(1).map(|m| m.as_str())
}

/// Name of canteen `mensa_id` in the location table a mensatogo page embeds in its
/// scripts as `var locations = JSON.parse(...)`.
pub fn name_from_mensatogo(html: &Html, mensa_id: &str) -> Option<String> {
    static_selector!(SCRIPT_SELECTOR <- "script");
    static_regex!(LOCATIONS_RE <- r#"var locations = JSON\.parse\((?s:.*)"#);
    let scripts: String = html
        .root_element()
        .select(&SCRIPT_SELECTOR)
        .map(inner_text)
        .collect();
    let table = LOCATIONS_RE.find(&scripts)?.as_str();
    let entry = regex::Regex::new(&format!(
        r#""{}":("(?:[^"\\]|\\.)*")"#,
        regex::escape(mensa_id)
    ))
    .ok()?;
    let literal = entry.captures(table)?.get(1)?.as_str();
    let name: String = serde_json::from_str(literal).ok()?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_owned())
}

/// Text of the element following the one that holds the icon matched by `selector`,
/// one line per text node.
fn text_next_to_icon(selector: &scraper::Selector, element: ElementRef<'_>) -> Option<String> {
    let icon = element.select(selector).next()?;
    let holder = parent_element(icon)?;
    let value = next_sibling_element(holder)?;
    Some(value.text().collect::<Vec<_>>().join("\n"))
}

fn single_line(raw: &str) -> String {
    remove_excess_whitespace(raw.trim()).into_owned()
}

/// Drops the district note and joins the lines of the address with `, `.
fn clean_address(raw: &str) -> String {
    static_regex!(DISTRICT_RE <- r"\(Bezirk[^)]*\)");
    let without_district = DISTRICT_RE.replace_all(raw, "");
    without_district
        .lines()
        .map(single_line)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
