//! Typed JSON documents stored under a single key.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::repository::{KeyValueStore, StorageError};

/// One serde type bound to one key of a `KeyValueStore`.
///
/// Reads never fail: an unreadable or corrupt document is logged and
/// reported as absent. Writes propagate adapter errors.
pub struct JsonCollection<T> {
    kv: Arc<dyn KeyValueStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            kv,
            key,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load and decode the document, or `None` if it is missing or unusable.
    pub async fn load(&self) -> Option<T> {
        let raw = match self.kv.get(self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = self.key, error = %err, "read failed, using empty value");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = self.key, error = %err, "corrupt document, using empty value");
                None
            }
        }
    }

    /// Encode and write the whole document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails, or the adapter's
    /// error if the write fails.
    pub async fn store(&self, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        match self.kv.set(self.key, &raw).await {
            Ok(()) => {
                debug!(key = self.key, bytes = raw.len(), "stored document");
                Ok(())
            }
            Err(err) => {
                error!(key = self.key, error = %err, "write failed");
                Err(err)
            }
        }
    }
}

impl<T> JsonCollection<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    /// Load a list document, treating a missing or corrupt one as empty.
    pub async fn load_all(&self) -> Vec<T> {
        self.load().await.unwrap_or_default()
    }
}
