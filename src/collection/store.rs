use tracing::{info, warn};

use super::storage::Storage;
use crate::catalog::BookRecord;

/// Storage key holding the serialized collection.
pub const COLLECTION_KEY: &str = "bookCollection";

/// Result of [`Collection::add`], with the notification to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    AlreadyPresent(String),
}

impl AddOutcome {
    pub fn message(&self) -> &str {
        match self {
            AddOutcome::Added(msg) | AddOutcome::AlreadyPresent(msg) => msg,
        }
    }
}

/// Ordered, id-unique set of saved books.
///
/// Every mutation rewrites the whole collection to storage. Storage problems
/// never surface to callers: a missing or unreadable value loads as empty and
/// a failed write is logged.
pub struct Collection {
    books: Vec<BookRecord>,
    storage: Box<dyn Storage>,
}

impl Collection {
    /// Rehydrate the collection from storage.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let books = match storage.get(COLLECTION_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<BookRecord>>(&json) {
                Ok(books) => dedup_by_id(books),
                Err(e) => {
                    warn!("Stored collection is unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read stored collection, starting empty: {}", e);
                Vec::new()
            }
        };

        info!("Loaded collection with {} book(s)", books.len());
        Self { books, storage }
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.books.iter().any(|b| b.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&BookRecord> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Append `book` unless a record with the same id is already saved.
    pub fn add(&mut self, book: BookRecord) -> AddOutcome {
        if self.contains(&book.id) {
            return AddOutcome::AlreadyPresent(format!(
                "{} is already in your collection.",
                book.title
            ));
        }

        let message = format!("{} added to collection!", book.title);
        self.books.push(book);
        self.persist();
        AddOutcome::Added(message)
    }

    /// Remove the record with `id` if present. Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.books.len();
        self.books.retain(|b| b.id != id);
        self.persist();
        self.books.len() != before
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.books) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize collection: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(COLLECTION_KEY, &json) {
            warn!("Failed to persist collection: {}", e);
        }
    }
}

/// Keep the first occurrence of each id.
fn dedup_by_id(books: Vec<BookRecord>) -> Vec<BookRecord> {
    let mut seen = std::collections::HashSet::new();
    books
        .into_iter()
        .filter(|b| seen.insert(b.id.clone()))
        .collect()
}
