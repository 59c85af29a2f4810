use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::types::{BookRecord, VolumesResponse};
use crate::error::{Result, ScoutError};

pub const DEFAULT_CATALOG_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Result cap for every catalog search.
pub const MAX_RESULTS: u32 = 5;

/// Book metadata lookup.
///
/// Neither method fails: a bad status, a transport error and an empty result
/// all come back as `None`.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Exact title + author search. Falls back to a free-text search on
    /// `"<title> <author>"` when the exact search has no items.
    async fn search_by_title_author(&self, title: &str, author: &str) -> Option<Vec<BookRecord>>;

    async fn search_by_text(&self, query: &str) -> Option<Vec<BookRecord>>;
}

enum FetchOutcome {
    Found(Vec<BookRecord>),
    Empty,
    Failed,
}

/// Client for the Google Books volumes search.
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("BookScout/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// `q` must already be URL-encoded.
    async fn fetch(&self, q: &str, context: &str) -> FetchOutcome {
        let url = format!("{}?q={}&maxResults={}", self.base_url, q, MAX_RESULTS);
        info!("Catalog search ({}): {}", context, url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Catalog request failed ({}): {}", context, e);
                return FetchOutcome::Failed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("Catalog API error ({}): {}", context, status.as_u16());
            return FetchOutcome::Failed;
        }

        let data: VolumesResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to decode catalog response ({}): {}", context, e);
                return FetchOutcome::Failed;
            }
        };

        match data.items {
            Some(items) if !items.is_empty() => {
                info!("Catalog returned {} item(s) ({})", items.len(), context);
                FetchOutcome::Found(items.into_iter().map(BookRecord::from).collect())
            }
            _ => {
                warn!("Catalog returned no items ({})", context);
                FetchOutcome::Empty
            }
        }
    }
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    async fn search_by_title_author(&self, title: &str, author: &str) -> Option<Vec<BookRecord>> {
        let q = format!(
            "intitle:{}+inauthor:{}",
            urlencoding::encode(title),
            urlencoding::encode(author)
        );

        match self.fetch(&q, "title/author").await {
            FetchOutcome::Found(records) => Some(records),
            FetchOutcome::Empty => {
                info!("No exact match for '{}' by '{}', trying free text", title, author);
                self.search_by_text(&format!("{} {}", title, author)).await
            }
            FetchOutcome::Failed => None,
        }
    }

    async fn search_by_text(&self, query: &str) -> Option<Vec<BookRecord>> {
        match self.fetch(&urlencoding::encode(query), "free text").await {
            FetchOutcome::Found(records) => Some(records),
            FetchOutcome::Empty | FetchOutcome::Failed => None,
        }
    }
}
