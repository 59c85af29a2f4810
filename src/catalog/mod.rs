//! Book metadata enrichment from the public catalog.

pub mod client;
pub mod types;

pub use client::{BookCatalog, GoogleBooksClient, DEFAULT_CATALOG_BASE_URL, MAX_RESULTS};
pub use types::BookRecord;
