use scraper::ElementRef;

use crate::parse::error::Result;
use crate::parse::text_from_selection::{inner_text, next_sibling_element, parent_element};
use crate::parse::Error;
use crate::{static_regex, static_selector};

/// Weekday abbreviations as printed upstream, Monday first.
static WEEKDAYS: [&str; 7] = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];

/// Opening hours for one week, Monday first. `None` marks a closed day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Times([Option<String>; 7]);

impl Times {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Option<String>; 7] {
        &self.0
    }

    /// Opens every day from `start` to `end` inclusive (0 = Monday).
    pub fn set_range(&mut self, start: usize, end: usize, hours: &str) -> Result<()> {
        if end < start {
            return Err(Error::Invariant(format!(
                "weekday range ends on day {end} before it starts on day {start}"
            )));
        }
        let slots = self.0.get_mut(start..=end).ok_or_else(|| {
            Error::Invariant(format!("weekday range {start}..={end} is out of the week"))
        })?;
        for slot in slots {
            *slot = Some(hours.to_owned());
        }
        Ok(())
    }

    /// Applies one block of the opening hours listing, e.g. `Mo. – Fr.` followed by
    /// `08:00 – 16:00 Uhr`. Returns whether the block matched.
    pub fn apply_block(&mut self, text: &str) -> Result<bool> {
        static_regex!(BLOCK_RE <- r"(?s)(?P<start>Mo|Di|Mi|Do|Fr|Sa|So)\.(?:\s*[–-]\s*(?P<end>Mo|Di|Mi|Do|Fr|Sa|So)\.)?.*?(?P<open>\d{2}:\d{2})\s*[–-]\s*(?P<close>\d{2}:\d{2})\s*Uhr");
        let Some(caps) = BLOCK_RE.captures(text) else {
            return Ok(false);
        };
        let start = weekday_index(&caps["start"])?;
        let end = match caps.name("end") {
            Some(end) => weekday_index(end.as_str())?,
            None => start,
        };
        let hours = format!("{}-{}", &caps["open"], &caps["close"]);
        self.set_range(start, end, &hours)?;
        Ok(true)
    }

    /// Reads the blocks following the clock icon. `None` if the page has no opening hours.
    pub fn from_html_element(element: ElementRef<'_>) -> Result<Option<Self>> {
        static_selector!(TIME_ICON_SELECTOR <- "i.glyphicon.glyphicon-time");
        let Some(icon) = element.select(&TIME_ICON_SELECTOR).next() else {
            return Ok(None);
        };
        let mut block = parent_element(icon)
            .and_then(parent_element)
            .and_then(next_sibling_element);

        let mut times = Self::new();
        for _ in 0..WEEKDAYS.len() {
            let Some(current) = block else {
                break;
            };
            if !times.apply_block(&inner_text(current))? {
                break;
            }
            block = next_sibling_element(current);
        }
        Ok(Some(times))
    }
}

fn weekday_index(abbreviation: &str) -> Result<usize> {
    WEEKDAYS
        .iter()
        .position(|day| *day == abbreviation)
        .ok_or_else(|| Error::Internal(format!("unknown weekday {abbreviation}")))
}
