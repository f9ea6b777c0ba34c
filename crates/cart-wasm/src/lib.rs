//! # cart-wasm
//!
//! WebAssembly bindings for the storefront cart.
//!
//! The page constructs one `WasmCart` and hands it to whatever renders the
//! cart badge and cart page. The cart persists itself to `localStorage` and
//! reports every change through the callback registered with `onChange`;
//! rendering stays on the JavaScript side.
//!
//! Change callbacks are delivered from a microtask after the mutating call
//! has returned, never from inside it. A callback may therefore read or
//! mutate the cart (`cart.count()`, `cart.items()`), but it sees the cart as
//! it is when the callback runs, not as it was when the change happened.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart } from 'cart-wasm';
//!
//! await init();
//!
//! const cart = new WasmCart('cart', 'gbp', catalog);
//! cart.onChange((change) => {
//!   if (change.kind === 'changed') badge.textContent = change.summary.count;
//!   if (change.kind === 'added') toast(`${change.name} added to cart`);
//! });
//!
//! try {
//!   cart.add({ id: 'london-gins-tasting-gift' });
//! } catch (err) {
//!   alert(err.message);
//! }
//!
//! const sessionId = await cart.checkout('/api/create-checkout-session');
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/cart-wasm --target web
//! ```

pub mod storage;

use cart_core::{
    AddToCart, Cart, CartError, CartObserver, CartSummary, Currency, LineItem, ProductCatalog,
    DEFAULT_CART_KEY, LEGACY_CART_KEY,
};
use serde::{Deserialize, Serialize};
use storage::{js_message, LocalStorage};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Change notification passed to the `onChange` callback
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Change<'a> {
    Added {
        id: &'a str,
        name: &'a str,
        quantity_added: u32,
    },
    Removed {
        id: &'a str,
    },
    Changed {
        summary: &'a CartSummary,
    },
}

/// Forwards cart changes to a JavaScript callback.
///
/// Notifications fire while the `WasmCart` is still mutably borrowed, so
/// the callback is queued on the microtask queue instead of called inline.
struct JsObserver {
    callback: js_sys::Function,
}

impl JsObserver {
    fn notify(&self, change: &Change<'_>) {
        let value = match serde_wasm_bindgen::to_value(change) {
            Ok(value) => value,
            Err(e) => {
                log(&format!("cart: failed to encode change: {}", e));
                return;
            }
        };
        let callback = self.callback.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                log(&format!("cart: onChange callback threw: {}", js_message(&e)));
            }
        });
    }
}

impl CartObserver for JsObserver {
    fn on_item_added(&self, item: &LineItem, quantity_added: u32) {
        self.notify(&Change::Added {
            id: &item.id,
            name: &item.name,
            quantity_added,
        });
    }

    fn on_item_removed(&self, id: &str) {
        self.notify(&Change::Removed { id });
    }

    fn on_cart_changed(&self, summary: &CartSummary) {
        self.notify(&Change::Changed { summary });
    }
}

/// Cart handle exported to JavaScript
#[wasm_bindgen]
pub struct WasmCart {
    cart: Cart<LocalStorage>,
    catalog: ProductCatalog,
}

#[wasm_bindgen]
impl WasmCart {
    /// Rehydrate the cart stored under `key`.
    ///
    /// Without a key the `"cart"` slot is used, picking up a cart the
    /// storefront script left under `azuSpiritsCart`.
    ///
    /// `catalog` is optional: `{ products: [...] }` in the catalog schema.
    #[wasm_bindgen(constructor)]
    pub fn new(
        key: Option<String>,
        currency: Option<String>,
        catalog: JsValue,
    ) -> Result<WasmCart, JsValue> {
        let currency = match currency.as_deref() {
            Some(code) => parse_currency(code)
                .ok_or_else(|| js_error(&format!("Unsupported currency: {}", code)))?,
            None => Currency::default(),
        };
        let catalog = if catalog.is_undefined() || catalog.is_null() {
            ProductCatalog::new()
        } else {
            serde_wasm_bindgen::from_value(catalog)
                .map_err(|e| js_error(&format!("Invalid catalog: {}", e)))?
        };

        let storage = LocalStorage::open()?;
        let cart = match key {
            Some(key) => Cart::load(storage, key, currency),
            None => Cart::load_or_migrate(storage, DEFAULT_CART_KEY, LEGACY_CART_KEY, currency),
        };
        Ok(Self { cart, catalog })
    }

    /// Register a change callback, invoked asynchronously after each change
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.cart.subscribe(Box::new(JsObserver { callback }));
    }

    /// Add a product: `{ id, name?, price?, image?, price_id?, quantity? }`.
    ///
    /// Throws when the product has no price reference.
    pub fn add(&mut self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: AddToCart = serde_wasm_bindgen::from_value(request)
            .map_err(|e| js_error(&format!("Invalid item: {}", e)))?;
        if !validate_product_id(&request.id) {
            return Err(to_js_error(CartError::InvalidRequest(format!(
                "Invalid product id: {:?}",
                request.id
            ))));
        }
        let event = self
            .cart
            .add_product(&self.catalog, request)
            .map_err(to_js_error)?;
        to_js(&event)
    }

    pub fn remove(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let event = self.cart.remove(id).map_err(to_js_error)?;
        to_js(&event)
    }

    #[wasm_bindgen(js_name = setQuantity)]
    pub fn set_quantity(&mut self, id: &str, quantity: i32) -> Result<JsValue, JsValue> {
        let event = self
            .cart
            .set_quantity(id, i64::from(quantity))
            .map_err(to_js_error)?;
        to_js(&event)
    }

    pub fn clear(&mut self) -> Result<JsValue, JsValue> {
        let event = self.cart.clear().map_err(to_js_error)?;
        to_js(&event)
    }

    /// Re-read `localStorage` (e.g. from a `storage` event in another tab)
    pub fn reload(&mut self) {
        self.cart.reload();
    }

    /// Cart total as a decimal amount
    pub fn total(&self) -> f64 {
        self.cart.total().as_decimal()
    }

    /// Cart total formatted for display (e.g. "£104.00")
    #[wasm_bindgen(js_name = totalDisplay)]
    pub fn total_display(&self) -> String {
        self.cart.total().display()
    }

    pub fn count(&self) -> u32 {
        self.cart.count()
    }

    pub fn items(&self) -> Result<JsValue, JsValue> {
        to_js(self.cart.items())
    }

    /// `{ items: [{ price, quantity }] }` for the session endpoint
    #[wasm_bindgen(js_name = checkoutPayload)]
    pub fn checkout_payload(&self) -> Result<JsValue, JsValue> {
        let payload = self.cart.checkout_payload().map_err(to_js_error)?;
        to_js(&payload)
    }

    /// POST the cart to the session endpoint; resolves to the session id.
    ///
    /// The cart is left untouched; clear it from the success page.
    pub fn checkout(&self, endpoint: String) -> Result<js_sys::Promise, JsValue> {
        let payload = self.cart.checkout_payload().map_err(to_js_error)?;
        let body = serde_json::to_string(&payload).map_err(|e| js_error(&e.to_string()))?;
        Ok(wasm_bindgen_futures::future_to_promise(post_checkout(
            endpoint, body,
        )))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SessionReply {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map the session endpoint's reply to a session id or an error message.
///
/// An unreadable or empty body on a failed request reports the HTTP status.
fn session_outcome(ok: bool, status: u16, body: &str) -> Result<String, String> {
    let reply: SessionReply = match serde_json::from_str(body) {
        Ok(reply) => reply,
        Err(_) if !ok => SessionReply::default(),
        Err(e) => return Err(format!("Unexpected checkout response: {}", e)),
    };

    match (ok, reply.id, reply.error) {
        (true, Some(id), _) if !id.is_empty() => Ok(id),
        (_, _, Some(error)) => Err(error),
        _ => Err(format!("Checkout failed with HTTP {}", status)),
    }
}

async fn post_checkout(endpoint: String, body: String) -> Result<JsValue, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("No window available"))?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&body));

    let request = web_sys::Request::new_with_str_and_init(&endpoint, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();

    session_outcome(response.ok(), response.status(), &body)
        .map(|id| JsValue::from_str(&id))
        .map_err(|message| js_error(&message))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error(&e.to_string()))
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

fn to_js_error(err: CartError) -> JsValue {
    js_error(&err.to_string())
}

/// Parse an ISO 4217 code (case-insensitive)
pub fn parse_currency(code: &str) -> Option<Currency> {
    match code.to_ascii_lowercase().as_str() {
        "gbp" => Some(Currency::GBP),
        "usd" => Some(Currency::USD),
        "eur" => Some(Currency::EUR),
        "cad" => Some(Currency::CAD),
        "aud" => Some(Currency::AUD),
        "jpy" => Some(Currency::JPY),
        _ => None,
    }
}

/// Validate a product ID format
#[wasm_bindgen(js_name = validateProductId)]
pub fn validate_product_id(product_id: &str) -> bool {
    !product_id.is_empty()
        && product_id.len() <= 100
        && product_id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Log to browser console
fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("gbp"), Some(Currency::GBP));
        assert_eq!(parse_currency("GBP"), Some(Currency::GBP));
        assert_eq!(parse_currency("xyz"), None);
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("six-styles-scotch-whisky-tasting-set"));
        assert!(validate_product_id("product_123"));
        assert!(!validate_product_id(""));
        assert!(!validate_product_id("invalid id"));
        assert!(!validate_product_id(&"a".repeat(101)));
    }

    #[test]
    fn test_session_outcome_success() {
        assert_eq!(
            session_outcome(true, 200, r#"{"id":"cs_test_a1"}"#),
            Ok("cs_test_a1".to_string())
        );
    }

    #[test]
    fn test_session_outcome_error_body() {
        assert_eq!(
            session_outcome(
                false,
                500,
                r#"{"error":"No such price: 'price_london'","code":500}"#
            ),
            Err("No such price: 'price_london'".to_string())
        );
        assert_eq!(
            session_outcome(false, 405, r#"{"error":"Method not allowed","code":405}"#),
            Err("Method not allowed".to_string())
        );
    }

    #[test]
    fn test_session_outcome_failure_without_body() {
        assert_eq!(
            session_outcome(false, 502, ""),
            Err("Checkout failed with HTTP 502".to_string())
        );
        assert_eq!(
            session_outcome(false, 504, "<html>Gateway Timeout</html>"),
            Err("Checkout failed with HTTP 504".to_string())
        );
    }

    #[test]
    fn test_session_outcome_success_without_id() {
        assert_eq!(
            session_outcome(true, 200, "{}"),
            Err("Checkout failed with HTTP 200".to_string())
        );
        assert!(session_outcome(true, 200, "not json")
            .unwrap_err()
            .starts_with("Unexpected checkout response"));
    }

    #[test]
    fn test_change_encoding_shape() {
        let summary = CartSummary {
            count: 2,
            lines: 1,
            total: cart_core::Price::new(104.0, Currency::GBP),
        };
        let value = serde_json::to_value(Change::Changed { summary: &summary }).unwrap();
        assert_eq!(value["kind"], "changed");
        assert_eq!(value["summary"]["count"], 2);

        let value = serde_json::to_value(Change::Added {
            id: "a",
            name: "Gin",
            quantity_added: 1,
        })
        .unwrap();
        assert_eq!(value["kind"], "added");
        assert_eq!(value["quantity_added"], 1);
    }
}
