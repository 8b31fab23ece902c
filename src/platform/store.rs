//! Key-value storage interface and the in-memory store

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::consts::PROBE_KEY;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded writing {0:?}")]
    QuotaExceeded(String),
    #[error("javascript error: {0}")]
    Js(String),
}

/// String key-value storage, shaped after the Web Storage API
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}

/// Check that `store` accepts a write and a removal.
///
/// Browsers with storage disabled still expose the object but throw on use,
/// so presence alone says nothing.
pub fn probe(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.set_item(PROBE_KEY, PROBE_KEY)?;
    store.remove_item(PROBE_KEY)
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
    max_items: Option<usize>,
    disabled: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses new keys once it holds `max_items`
    pub fn with_quota(max_items: usize) -> Self {
        Self {
            max_items: Some(max_items),
            ..Self::default()
        }
    }

    /// A store that fails every operation, like LocalStorage under strict
    /// privacy settings
    pub fn disabled() -> Self {
        let store = Self::default();
        store.disabled.set(true);
        store
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn check_enabled(&self) -> Result<(), StoreError> {
        if self.disabled.get() {
            return Err(StoreError::Unavailable("memory store disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_enabled()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_enabled()?;
        let mut items = self.items.borrow_mut();
        if let Some(max) = self.max_items {
            if !items.contains_key(key) && items.len() >= max {
                return Err(StoreError::QuotaExceeded(key.to_string()));
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.check_enabled()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
