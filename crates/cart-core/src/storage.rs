//! # Cart Storage
//!
//! Durable key-value slot backing the cart. The backend stores raw strings;
//! JSON encoding of the item list is the cart's job, not the backend's.
//!
//! Implementations:
//! - `MemoryStorage` (tests, server-side scratch carts)
//! - `LocalStorage` in `cart-wasm` (browser `window.localStorage`)

use crate::error::CartResult;
use std::collections::HashMap;

/// Key used for the cart slot when none is given
pub const DEFAULT_CART_KEY: &str = "cart";

/// Slot the storefront script kept its cart under
pub const LEGACY_CART_KEY: &str = "azuSpiritsCart";

/// String key-value storage for persisted carts.
///
/// Writes are last-writer-wins; there is no coordination between
/// handles pointing at the same slot.
pub trait CartStorage {
    /// Read a value by key. `None` if absent or unreadable.
    fn load(&self, key: &str) -> Option<String>;

    /// Write a value under key, replacing any previous value.
    fn save(&mut self, key: &str, data: &str) -> CartResult<()>;

    /// Remove a key from storage.
    fn remove(&mut self, key: &str) -> CartResult<()>;
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: pre-seed a slot
    pub fn with_slot(mut self, key: impl Into<String>, data: impl Into<String>) -> Self {
        self.slots.insert(key.into(), data.into());
        self
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn save(&mut self, key: &str, data: &str) -> CartResult<()> {
        self.slots.insert(key.to_string(), data.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CartResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
