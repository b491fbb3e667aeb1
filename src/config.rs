use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{catalog::CatalogMode, parse::PriceMode};

pub static URL_META: &str = "https://www.stw.berlin/xhr/speiseplan-und-standortdaten.html";
pub static URL_MEAL: &str = "https://www.stw.berlin/xhr/speiseplan-wochentag.html";
/// Mensa TU, used to get hold of the facility listing.
pub static DEFAULT_ID: &str = "321";

pub const HTTP_MAX_RETRIES: u32 = 10;
pub const HTTP_SLEEP_STEP: Duration = Duration::from_secs(1);
/// "Bandwidth limit exceeded", sent by the upstream when it is overloaded.
pub const HTTP_STATUS_OVERLOADED: u16 = 509;

pub static DIRECT_LINK_TITLE_PREFIX: &str = "studierendenWERK BERLIN - ";
pub static CITY: &str = "Berlin";
pub static AVAILABILITY: &str = "public";
pub static SCHEDULE_HOUR: &str = "8";
pub static SCHEDULE_RETRY: &str = "45 3 1440";
pub static FEED_NAME: &str = "full";

pub static METADATA_FILE: &str = "metadata.xml";
pub static FULL_FEED_FILE: &str = "full.xml";

pub static IDS_CURRENT_FILE: &str = "ids_current";
pub static IDS_ARCHIVE_FILE: &str = "ids_archive";
pub static IDS_ALL_FILE: &str = "ids_all";
pub static IDS_NAMED_FILE: &str = "ids.json";
pub static INDEX_FILE: &str = "index.json";

/// Generate OpenMensa feeds for the canteens of the studierendenWERK BERLIN
#[derive(Parser, Debug, Clone)]
#[command(name = "stw_openmensa")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Refresh the persisted canteen identifiers and the index instead of generating feeds
    #[arg(long)]
    pub update_ids: bool,

    /// Directory holding the identifier lists, the index and one directory per canteen
    #[arg(long, env = "STW_REPO", default_value = "berlin", value_name = "DIR")]
    pub repo: PathBuf,

    /// Public base url the generated feeds are served from
    #[arg(
        long,
        env = "STW_FEED_BASE_URL",
        default_value = "https://raw.githubusercontent.com/escrl/openmensa-feed-berlin/master/",
        value_name = "URL"
    )]
    pub feed_base_url: String,

    /// First day of the feed, relative to today
    #[arg(long, env = "STW_DAYS_BEFORE", default_value_t = -1, allow_negative_numbers = true)]
    pub days_before: i64,

    /// Last day of the feed, relative to today
    #[arg(long, env = "STW_DAYS_AFTER", default_value_t = 21, allow_negative_numbers = true)]
    pub days_after: i64,

    /// How prices are read from a meal (scan, slash)
    #[arg(long, env = "STW_PRICE_MODE", default_value = "scan", value_name = "MODE")]
    pub price_mode: PriceMode,

    /// How canteen identifiers are persisted (lists, named)
    #[arg(long, env = "STW_CATALOG_MODE", default_value = "lists", value_name = "MODE")]
    pub catalog_mode: CatalogMode,

    /// Number of canteens processed at the same time
    #[arg(long, env = "STW_CONCURRENCY", default_value_t = 1, value_name = "NUM")]
    pub concurrency: usize,
}

impl Config {
    /// Public url of a document generated for the canteen stored under `key`.
    pub fn feed_url(&self, key: &str, document: &str) -> String {
        format!("{}{key}/{document}", self.feed_base_url)
    }

    pub fn canteen_dir(&self, key: &str) -> PathBuf {
        self.repo.join(key)
    }
}
