//! Browser tests: `wasm-pack test --headless --firefox crates/cart-wasm`
#![cfg(target_arch = "wasm32")]

use cart_core::{Cart, CartStorage, Currency, LineItem, Price, LEGACY_CART_KEY};
use cart_wasm::storage::LocalStorage;
use cart_wasm::WasmCart;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn gin(id: &str) -> LineItem {
    LineItem::new(id, "Gin Tasting Set", Price::new(52.0, Currency::GBP))
        .with_price_id(format!("price_{}", id))
}

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let mut storage = LocalStorage::open().unwrap();
    storage.remove("cart-test").unwrap();

    let mut cart = Cart::load(storage, "cart-test", Currency::GBP);
    cart.add(gin("a"), 1).unwrap();
    cart.add(gin("a"), 1).unwrap();

    let reloaded = Cart::load(LocalStorage::open().unwrap(), "cart-test", Currency::GBP);
    assert_eq!(reloaded.count(), 2);
    assert_eq!(reloaded.total().as_decimal(), 104.0);

    let mut storage = reloaded.into_storage();
    storage.remove("cart-test").unwrap();
}

#[wasm_bindgen_test]
fn corrupt_slot_loads_empty() {
    let mut storage = LocalStorage::open().unwrap();
    storage.save("cart-corrupt", "{oops").unwrap();

    let cart = Cart::load(storage, "cart-corrupt", Currency::GBP);
    assert!(cart.is_empty());

    let mut storage = cart.into_storage();
    storage.remove("cart-corrupt").unwrap();
}

/// Resolves after pending microtasks have run
async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Call a method through the generated JS class, as page code would
fn call(target: &JsValue, method: &str, arg: &JsValue) -> JsValue {
    let function: js_sys::Function = js_sys::Reflect::get(target, &JsValue::from_str(method))
        .unwrap()
        .dyn_into()
        .unwrap();
    function.call1(target, arg).unwrap()
}

const LONDON_GIN: &str = r#"{
    "id": "london-gins-tasting-gift",
    "name": "London Gin Tasting Set",
    "price": { "amount": 5200, "currency": "gbp" },
    "price_id": "price_london"
}"#;

#[wasm_bindgen_test]
async fn change_callback_can_read_the_cart() {
    LocalStorage::open().unwrap().remove("cart-callback").unwrap();

    let cart = WasmCart::new(Some("cart-callback".into()), None, JsValue::UNDEFINED).unwrap();
    let cart = JsValue::from(cart);
    let seen = js_sys::Array::new();
    let callback = js_sys::Function::new_with_args(
        "cart, seen, change",
        "if (change.kind === 'changed') seen.push(cart.count());",
    )
    .bind2(&JsValue::NULL, &cart, &seen);
    call(&cart, "onChange", &callback);

    let item = js_sys::JSON::parse(LONDON_GIN).unwrap();
    call(&cart, "add", &item);
    call(&cart, "add", &item);
    assert_eq!(seen.length(), 0);

    next_tick().await;
    let counts: Vec<f64> = seen.iter().filter_map(|v| v.as_f64()).collect();
    assert_eq!(counts, vec![2.0, 2.0]);

    LocalStorage::open().unwrap().remove("cart-callback").unwrap();
}

#[wasm_bindgen_test]
fn default_cart_adopts_storefront_script_slot() {
    let mut storage = LocalStorage::open().unwrap();
    storage.remove("cart").unwrap();
    storage
        .save(
            LEGACY_CART_KEY,
            r#"[{"id":"london-gins-tasting-gift","priceId":"price_london","name":"London Gin Tasting Set","price":52,"image":"","quantity":2}]"#,
        )
        .unwrap();

    let cart = WasmCart::new(None, None, JsValue::UNDEFINED).unwrap();
    assert_eq!(cart.count(), 2);
    assert_eq!(cart.total(), 104.0);
    assert!(storage.load(LEGACY_CART_KEY).is_none());

    storage.remove("cart").unwrap();
}
