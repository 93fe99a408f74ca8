#![forbid(unsafe_code)]

pub mod collection;
pub mod progress_store;
pub mod repository;
pub mod sqlite;

pub use progress_store::{MissedOutcome, ProgressStore};
pub use repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};
