//! `window.localStorage` backend for the cart.

use cart_core::{CartError, CartResult, CartStorage};
use wasm_bindgen::JsValue;

/// Browser-scoped durable slot
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Open the page's `localStorage`
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let inner = window
            .local_storage()?
            .ok_or_else(|| JsValue::from_str("localStorage is disabled"))?;
        Ok(Self { inner })
    }
}

impl CartStorage for LocalStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, data: &str) -> CartResult<()> {
        self.inner
            .set_item(key, data)
            .map_err(|e| CartError::Storage(js_message(&e)))
    }

    fn remove(&mut self, key: &str) -> CartResult<()> {
        self.inner
            .remove_item(key)
            .map_err(|e| CartError::Storage(js_message(&e)))
    }
}

/// Best-effort text for a thrown JS value (quota errors arrive as DOMException)
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
