//! The user's saved books, persisted locally.

pub mod storage;
pub mod store;

pub use storage::{open_storage, JsonFileStorage, SqliteStorage, Storage, StorageBackend};
pub use store::{AddOutcome, Collection, COLLECTION_KEY};
