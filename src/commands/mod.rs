//! CLI command handlers. Each writes its human-readable output to `out`.

pub mod collection;
pub mod health;
pub mod identify;
pub mod search;

use anyhow::{Context, Result};

use crate::catalog::GoogleBooksClient;
use crate::collection::{open_storage, Collection};
use crate::config::Config;

pub(crate) fn open_collection(config: &Config) -> Result<Collection> {
    let storage = open_storage(config.storage, &config.data_dir)
        .with_context(|| format!("Failed to open collection storage in {:?}", config.data_dir))?;
    Ok(Collection::load(storage))
}

pub(crate) fn catalog_client(config: &Config) -> Result<GoogleBooksClient> {
    GoogleBooksClient::new(&config.catalog_base_url, config.request_timeout)
        .context("Failed to create catalog client")
}
