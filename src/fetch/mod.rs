#[cfg(test)]
pub mod test_server;

use std::{fmt::Display, time::Duration};

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use scraper::Html;
use tracing::{instrument, Level};

use crate::config::{
    DEFAULT_ID, HTTP_MAX_RETRIES, HTTP_SLEEP_STEP, HTTP_STATUS_OVERLOADED, URL_MEAL, URL_META,
};

#[derive(Debug)]
pub enum Error {
    /// The upstream answered with a status that is not worth retrying.
    Status { endpoint: String, status: u16 },
    /// The body of a successful response could not be read.
    CorruptResponse(String),
    RetriesExhausted { endpoint: String, attempts: u32 },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { endpoint, status } => write!(f, "{endpoint}: got status code {status}"),
            Self::CorruptResponse(msg) => write!(f, "Corrupt response: {msg}"),
            Self::RetriesExhausted { endpoint, attempts } => {
                write!(f, "{endpoint}: aborting after {attempts} retries")
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// What to do with a response, decided by its status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Accept,
    Retry,
    Abort,
}

fn disposition(status: StatusCode) -> Disposition {
    if status == StatusCode::OK {
        Disposition::Accept
    } else if status.as_u16() == HTTP_STATUS_OVERLOADED {
        Disposition::Retry
    } else {
        Disposition::Abort
    }
}

pub fn make_client() -> Client {
    Client::builder()
        .gzip(true)
        .build()
        .expect("client creation should succeed")
}

/// Issues requests against the upstream, retrying with a linearly growing pause.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    sleep_step: Duration,
}

impl Fetcher {
    pub const fn new(client: Client) -> Self {
        Self {
            client,
            max_retries: HTTP_MAX_RETRIES,
            sleep_step: HTTP_SLEEP_STEP,
        }
    }

    #[cfg(test)]
    pub const fn with_retries(client: Client, max_retries: u32, sleep_step: Duration) -> Self {
        Self {
            client,
            max_retries,
            sleep_step,
        }
    }

    /// Pause before the next try after attempt `attempt` (1-based) failed.
    fn backoff(&self, attempt: u32) -> Duration {
        self.sleep_step.saturating_mul(attempt)
    }

    /// POSTs `params` form encoded to `endpoint` and parses the answer.
    #[instrument(skip(self), level = Level::TRACE)]
    pub async fn post_form(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Html> {
        self.fetch(endpoint, params, || self.client.post(endpoint).form(params))
            .await
    }

    /// GETs a page linked from the upstream, with the same retry policy.
    #[instrument(skip(self), level = Level::TRACE)]
    pub async fn get(&self, url: &str) -> Result<Html> {
        self.fetch(url, &[], || self.client.get(url)).await
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        request: impl Fn() -> RequestBuilder,
    ) -> Result<Html> {
        for attempt in 1..=self.max_retries {
            let response = match request().send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(endpoint, ?params, attempt, error = %e, "request failed");
                    tokio::time::sleep(self.backoff(attempt)).await;
                    continue;
                }
            };
            match disposition(response.status()) {
                Disposition::Accept => {
                    let start = std::time::Instant::now();
                    let text = response
                        .text()
                        .await
                        .map_err(|e| Error::CorruptResponse(format!("{endpoint}: {e}")))?;
                    log::trace!("Got text of {endpoint} in \t {:?}", start.elapsed());
                    return Ok(Html::parse_document(&text));
                }
                Disposition::Retry => {
                    tracing::warn!(endpoint, ?params, attempt, "upstream overloaded");
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Disposition::Abort => {
                    return Err(Error::Status {
                        endpoint: endpoint.to_owned(),
                        status: response.status().as_u16(),
                    });
                }
            }
        }
        Err(Error::RetriesExhausted {
            endpoint: endpoint.to_owned(),
            attempts: self.max_retries,
        })
    }

    /// Facility page of canteen `id`, with its metadata and the listing of all facilities.
    pub async fn facility_page(&self, id: &str) -> Result<Html> {
        self.post_form(URL_META, &[("resources_id", id)]).await
    }

    /// Facility page of the default canteen, used for its listing.
    pub async fn listing_page(&self) -> Result<Html> {
        self.facility_page(DEFAULT_ID).await
    }

    /// Meal plan of canteen `id` on `date`.
    pub async fn menu_page(&self, id: &str, date: NaiveDate) -> Result<Html> {
        let date = date.format("%Y-%m-%d").to_string();
        self.post_form(URL_MEAL, &[("resources_id", id), ("date", &date)])
            .await
    }
}

pub fn date_iter(start: NaiveDate, count: i64) -> impl Iterator<Item = NaiveDate> {
    (0..count).map(move |x| start + chrono::Duration::days(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition() {
        assert_eq!(disposition(StatusCode::OK), Disposition::Accept);
        assert_eq!(
            disposition(StatusCode::from_u16(509).unwrap()),
            Disposition::Retry
        );
        assert_eq!(disposition(StatusCode::NOT_FOUND), Disposition::Abort);
        assert_eq!(
            disposition(StatusCode::INTERNAL_SERVER_ERROR),
            Disposition::Abort
        );
        // anything but a plain 200 is not a document
        assert_eq!(disposition(StatusCode::NO_CONTENT), Disposition::Abort);
    }

    #[test]
    fn test_linear_backoff() {
        let fetcher = Fetcher::new(make_client());
        assert_eq!(fetcher.backoff(1), Duration::from_secs(1));
        assert_eq!(fetcher.backoff(4), Duration::from_secs(4));
        assert_eq!(fetcher.backoff(10), Duration::from_secs(10));
    }

    #[test]
    fn test_date_iter() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let dates: Vec<_> = date_iter(start, 3).collect();
        assert_eq!(
            dates,
            vec![
                start,
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_exhausts_retries() {
        let fetcher = Fetcher::with_retries(make_client(), 2, Duration::ZERO);
        let err = fetcher
            .post_form("http://127.0.0.1:9/", &[("resources_id", "321")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RetriesExhausted { attempts: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_overloaded_then_ok() {
        let url = test_server::serve(vec![
            ("509 Bandwidth Limit Exceeded", String::new()),
            ("509 Bandwidth Limit Exceeded", String::new()),
            ("200 OK", "<html><head><title>Speiseplan</title></head></html>".into()),
        ])
        .await;
        let fetcher = Fetcher::with_retries(make_client(), 3, Duration::ZERO);
        let page = fetcher
            .post_form(&url, &[("resources_id", "321"), ("date", "2024-04-08")])
            .await
            .unwrap();
        crate::static_selector!(TITLE <- "title");
        let title = page.select(&TITLE).next().unwrap();
        assert_eq!(title.text().collect::<String>(), "Speiseplan");
    }

    #[tokio::test]
    async fn test_overloaded_exhausts_retries() {
        let url = test_server::serve(vec![
            ("509 Bandwidth Limit Exceeded", String::new()),
            ("509 Bandwidth Limit Exceeded", String::new()),
        ])
        .await;
        let fetcher = Fetcher::with_retries(make_client(), 2, Duration::ZERO);
        let err = fetcher.get(&url).await.unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_not_found_aborts_at_once() {
        // a second response would be served if the fetcher retried
        let url = test_server::serve(vec![
            ("404 Not Found", String::new()),
            ("200 OK", "<html></html>".into()),
        ])
        .await;
        let fetcher = Fetcher::with_retries(make_client(), 5, Duration::ZERO);
        let err = fetcher.get(&url).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    #[ignore = "talks to the live upstream"]
    async fn test_fetch_listing_page() {
        let start_time = std::time::Instant::now();
        let fetcher = Fetcher::new(make_client());
        let page = fetcher.listing_page().await.unwrap();
        println!(
            "Time taken to get listing page: {:?}",
            start_time.elapsed()
        );
        let facilities = crate::parse::Facility::all_from_html_element(page.root_element());
        assert!(!facilities.is_empty());
    }
}
