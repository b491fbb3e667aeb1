#![deny(unused_crate_dependencies)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod catalog;
mod config;
mod error;
mod fetch;
mod generate;
mod openmensa;
mod parse;
mod scrape;

use std::time::Instant;

use clap::Parser;

use crate::{
    catalog::Catalog,
    config::Config,
    fetch::{make_client, Fetcher},
};

pub use error::Result;

#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::parse();
    log::debug!("{config:?}");

    let fetcher = Fetcher::new(make_client());
    let catalog = Catalog::open(&config.repo, config.catalog_mode);
    let start = Instant::now();
    if config.update_ids {
        generate::update_ids(&config, &fetcher, &catalog).await?;
    } else {
        let today = chrono::Local::now().date_naive();
        generate::generate_feeds(&config, &fetcher, &catalog, today).await?;
    }
    log::info!("done, took {:?}", start.elapsed());
    Ok(())
}
