//! Key-value storage backends.
//!
//! The record store only needs string slots keyed by name, which is exactly
//! what `window.localStorage` offers. `MemoryStorage` has the same surface and
//! backs the tests, and the app falls back to it when the browser refuses to
//! hand out local storage.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// String slot storage
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

/// `window.localStorage`
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn new() -> StoreResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StoreError::Unavailable(
                "localStorage is disabled".to_string(),
            )),
            Err(err) => Err(StoreError::Unavailable(format!("{:?}", err))),
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage.get_item(key).map_err(|err| StoreError::Read {
            key: key.to_string(),
            message: format!("{:?}", err),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| StoreError::Write {
                key: key.to_string(),
                message: format!("{:?}", err),
            })
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.storage.remove_item(key).map_err(|err| StoreError::Write {
            key: key.to_string(),
            message: format!("{:?}", err),
        })
    }
}

/// In-memory slots
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads and decodes a JSON slot. An absent slot is `Ok(None)`.
pub fn load_slot<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub fn encode_slot<T: Serialize + ?Sized>(key: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })
}
