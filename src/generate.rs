use std::path::Path;

use chrono::NaiveDate;
use futures::{stream, StreamExt, TryStreamExt};

use crate::catalog::{write_atomic, Catalog, Entry};
use crate::config::{Config, FULL_FEED_FILE, METADATA_FILE};
use crate::fetch::Fetcher;
use crate::parse::Canteen;
use crate::{openmensa, scrape, Result};

/// Refreshes the persisted identifiers and the index from the upstream listing.
pub async fn update_ids(config: &Config, fetcher: &Fetcher, catalog: &Catalog) -> Result<()> {
    tokio::fs::create_dir_all(&config.repo).await?;
    let facilities = scrape::discover_facilities(fetcher).await?;
    if facilities.is_empty() {
        // would move every known canteen to the archive
        log::warn!("upstream listing is empty, keeping the stored identifiers");
        return Ok(());
    }
    let entries = catalog.update(&facilities).await?;
    catalog
        .write_index(&entries, |key| config.feed_url(key, METADATA_FILE))
        .await?;
    log::info!("stored {} canteens ({:?} mode)", entries.len(), catalog.mode());
    Ok(())
}

/// Writes metadata and full feed of every stored canteen, `config.concurrency` at a time.
pub async fn generate_feeds(
    config: &Config,
    fetcher: &Fetcher,
    catalog: &Catalog,
    today: NaiveDate,
) -> Result<()> {
    let entries = catalog.current().await?;
    if entries.is_empty() {
        log::warn!(
            "no canteens stored in {}, run with --update-ids first",
            config.repo.display()
        );
        return Ok(());
    }
    stream::iter(entries.iter().map(Ok))
        .try_for_each_concurrent(config.concurrency.max(1), |entry| {
            generate_canteen(config, fetcher, entry, today)
        })
        .await
}

async fn generate_canteen(
    config: &Config,
    fetcher: &Fetcher,
    entry: &Entry,
    today: NaiveDate,
) -> Result<()> {
    let dir = config.canteen_dir(&entry.key);
    tokio::fs::create_dir_all(&dir).await?;

    if let Some(canteen) = scrape::canteen_metadata(fetcher, config, entry).await? {
        write_feed(&dir.join(METADATA_FILE), &canteen).await?;
    }
    let feed = scrape::full_feed(fetcher, config, &entry.id, today).await;
    let closed = feed.days.iter().filter(|day| day.is_closed()).count();
    log::debug!(
        "{}: {} days, {closed} closed",
        entry.id,
        feed.days.len()
    );
    write_feed(&dir.join(FULL_FEED_FILE), &feed).await
}

async fn write_feed(path: &Path, canteen: &Canteen) -> Result<()> {
    log::info!("generate {}", path.display());
    let xml = openmensa::to_xml(canteen)?;
    write_atomic(path, &xml).await?;
    Ok(())
}
