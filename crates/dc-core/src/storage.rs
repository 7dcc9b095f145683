//! Persistence Adapter
//!
//! The persisted store maps domain keys to rule lists and is shared by every
//! execution context of the browsing session. There is no locking: each
//! operation is atomic per key and the last write wins.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Error type for storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Error type for importing a store document.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Invalid settings file: expected an object keyed by domain")]
    NotAnObject,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Key-value store shared across execution contexts.
///
/// Futures are not required to be `Send`: every context is single-threaded.
#[allow(async_fn_in_trait)]
pub trait Storage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Every entry in the store.
    async fn get_all(&self) -> Result<Map<String, Value>, StorageError>;

    /// Replace the whole store with `entries`.
    async fn replace_all(&self, entries: Map<String, Value>) -> Result<(), StorageError>;
}

/// In-process store. Clones share the same entries, the way frames of one
/// page share `chrome.storage.local`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<Map<String, Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    async fn get_all(&self) -> Result<Map<String, Value>, StorageError> {
        Ok(self.entries.borrow().clone())
    }

    async fn replace_all(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        *self.entries.borrow_mut() = entries;
        Ok(())
    }
}

/// Serialize the entire store as an indented JSON document.
pub async fn export_store<S: Storage>(storage: &S) -> Result<String, StorageError> {
    let entries = storage.get_all().await?;
    Ok(serde_json::to_string_pretty(&Value::Object(entries))?)
}

/// Replace the entire store with the document produced by [`export_store`].
///
/// The document is parsed before anything is written, so a malformed input
/// leaves the store untouched. Returns the number of domains imported.
pub async fn import_store<S: Storage>(storage: &S, document: &str) -> Result<usize, ImportError> {
    let value: Value = serde_json::from_str(document).map_err(ImportError::Parse)?;
    let Value::Object(entries) = value else {
        return Err(ImportError::NotAnObject);
    };

    let domains = entries.len();
    storage.replace_all(entries).await?;
    log::info!("Imported rules for {} domain(s)", domains);
    Ok(domains)
}
