//! Turns upstream pages into canteens and days. A failed fetch is logged and
//! yields no data, only broken extraction invariants are passed on.

use chrono::NaiveDate;
use futures::StreamExt;
use url::Url;

use crate::catalog::Entry;
use crate::config::{
    Config, AVAILABILITY, CITY, DIRECT_LINK_TITLE_PREFIX, FEED_NAME, FULL_FEED_FILE,
    SCHEDULE_HOUR, SCHEDULE_RETRY, URL_META,
};
use crate::fetch::{self, date_iter, Fetcher};
use crate::parse::{
    direct_link, mensatogo_id, name_from_mensatogo, name_from_title, Canteen, Day, Facility,
    Feed, FeedSchedule, NameSource, PriceMode,
};
use crate::Result;

/// Every facility in the upstream listing, identifiers and display names.
pub async fn discover_facilities(fetcher: &Fetcher) -> fetch::Result<Vec<Facility>> {
    let page = fetcher.listing_page().await?;
    let facilities = Facility::all_from_html_element(page.root_element());
    log::info!("found {} facilities", facilities.len());
    Ok(facilities)
}

/// Metadata of the canteen behind `entry`, `None` if its facility page is unavailable.
pub async fn canteen_metadata(
    fetcher: &Fetcher,
    config: &Config,
    entry: &Entry,
) -> Result<Option<Canteen>> {
    let id = entry.id.as_str();
    let page = match fetcher.facility_page(id).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!("{id}: no metadata: {e}");
            return Ok(None);
        }
    };
    let mut canteen = Canteen::from_facility_page(&page, id)?;
    let source = direct_link(&page);
    if canteen.name.is_empty() {
        if let Some(name_source) = NameSource::from_facility_page(&page) {
            canteen.name = fallback_name(fetcher, id, name_source)
                .await
                .unwrap_or_default();
        } else {
            log::warn!("{id}: no name, neither a direct link nor an iframe");
        }
    }
    canteen.city = CITY.to_owned();
    canteen.availability = Some(AVAILABILITY.to_owned());
    canteen.feeds = vec![Feed {
        name: FEED_NAME.to_owned(),
        schedule: Some(FeedSchedule {
            hour: SCHEDULE_HOUR.to_owned(),
            retry: Some(SCHEDULE_RETRY.to_owned()),
        }),
        url: config.feed_url(&entry.key, FULL_FEED_FILE),
        source,
    }];
    Ok(Some(canteen))
}

async fn fallback_name(fetcher: &Fetcher, id: &str, source: NameSource) -> Option<String> {
    match source {
        NameSource::DirectLink(link) => {
            let url = resolve(id, &link)?;
            let page = fetcher
                .get(url.as_str())
                .await
                .map_err(|e| log::warn!("{id}: name: direct link {url}: {e}"))
                .ok()?;
            let name = name_from_title(&page, DIRECT_LINK_TITLE_PREFIX);
            if name.is_none() {
                log::warn!("{id}: name: no title on {url}");
            }
            name
        }
        NameSource::Iframe(src) => {
            let Some(mensa_id) = mensatogo_id(&src) else {
                log::warn!("{id}: name: no mensa id in iframe {src}");
                return None;
            };
            let url = resolve(id, &src)?;
            let page = fetcher
                .get(url.as_str())
                .await
                .map_err(|e| log::warn!("{id}: name: iframe {url}: {e}"))
                .ok()?;
            let name = name_from_mensatogo(&page, mensa_id);
            if name.is_none() {
                log::warn!("{id}: name: mensa {mensa_id} not found on {url}");
            }
            name
        }
    }
}

/// Links on a facility page may be relative to it.
fn resolve(id: &str, link: &str) -> Option<Url> {
    Url::parse(URL_META)
        .and_then(|base| base.join(link))
        .map_err(|e| log::warn!("{id}: name: bad link {link:?}: {e}"))
        .ok()
}

/// Dates from `today + before` to `today + after`, both inclusive.
pub fn feed_dates(today: NaiveDate, before: i64, after: i64) -> impl Iterator<Item = NaiveDate> {
    date_iter(today + chrono::Duration::days(before), (after - before + 1).max(0))
}

/// Menu of canteen `id` on `date`, `None` if the page is unavailable.
pub async fn day(fetcher: &Fetcher, id: &str, date: NaiveDate, price_mode: PriceMode) -> Option<Day> {
    match fetcher.menu_page(id, date).await {
        Ok(page) => Some(Day::from_html(&page, date, price_mode, id)),
        Err(e) => {
            log::warn!("{id}: {date}: no menu: {e}");
            None
        }
    }
}

/// The full feed of canteen `id`: only days, fetched one after another in date order.
pub async fn full_feed(fetcher: &Fetcher, config: &Config, id: &str, today: NaiveDate) -> Canteen {
    let days = futures::stream::iter(feed_dates(today, config.days_before, config.days_after))
        .filter_map(|date| day(fetcher, id, date, config.price_mode))
        .collect()
        .await;
    Canteen {
        days,
        ..Canteen::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 8).unwrap();
        let dates: Vec<_> = feed_dates(today, -1, 21).collect();
        assert_eq!(dates.len(), 23);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 4, 7).unwrap());
        assert_eq!(dates[22], NaiveDate::from_ymd_opt(2024, 4, 29).unwrap());

        assert_eq!(feed_dates(today, 0, 0).collect::<Vec<_>>(), vec![today]);
        assert_eq!(feed_dates(today, 2, 1).count(), 0);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve("1", "https://mensatogo.stw.berlin/?mensa=47&embed=1")
                .unwrap()
                .as_str(),
            "https://mensatogo.stw.berlin/?mensa=47&embed=1"
        );
        assert_eq!(
            resolve("1", "/mensen/mensa-tu.html").unwrap().as_str(),
            "https://www.stw.berlin/mensen/mensa-tu.html"
        );
    }

    fn fast_fetcher() -> Fetcher {
        Fetcher::with_retries(fetch::make_client(), 2, std::time::Duration::ZERO)
    }

    #[tokio::test]
    async fn test_name_from_direct_link_title() {
        let url = fetch::test_server::serve(vec![(
            "200 OK",
            "<html><head><title>studierendenWERK BERLIN - Mensa Nord</title></head></html>".into(),
        )])
        .await;
        let name = fallback_name(&fast_fetcher(), "1", NameSource::DirectLink(url)).await;
        assert_eq!(name.as_deref(), Some("Mensa Nord"));
    }

    #[tokio::test]
    async fn test_name_from_mensatogo_iframe() {
        let widget = std::fs::read_to_string(
            "./src/parse/html_examples/facility_page/mensatogo_widget.html",
        )
        .unwrap();
        let base = fetch::test_server::serve(vec![("200 OK", widget)]).await;
        let iframe = format!("{base}?mensa=47&embed=1");
        let name = fallback_name(&fast_fetcher(), "1", NameSource::Iframe(iframe)).await;
        assert_eq!(name.as_deref(), Some("Mensa \"Pastaria\" Adlershof"));
    }

    #[tokio::test]
    async fn test_name_fallback_failures_yield_nothing() {
        let url = fetch::test_server::serve(vec![("404 Not Found", String::new())]).await;
        let fetcher = fast_fetcher();
        assert_eq!(fallback_name(&fetcher, "1", NameSource::DirectLink(url)).await, None);
        // no mensa parameter, nothing is fetched
        let iframe = "https://mensatogo.stw.berlin/?embed=1".to_owned();
        assert_eq!(fallback_name(&fetcher, "1", NameSource::Iframe(iframe)).await, None);
    }

    #[tokio::test]
    #[ignore = "talks to the live upstream"]
    async fn test_canteen_metadata() {
        use clap::Parser;
        let fetcher = Fetcher::new(fetch::make_client());
        let config = Config::parse_from(["stw_openmensa"]);
        let entry = Entry {
            id: "321".into(),
            key: "321".into(),
        };
        let canteen = canteen_metadata(&fetcher, &config, &entry)
            .await
            .unwrap()
            .unwrap();
        assert!(!canteen.name.is_empty());
        assert_eq!(canteen.feeds.len(), 1);
    }
}
