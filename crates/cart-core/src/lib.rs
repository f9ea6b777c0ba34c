//! # cart-core
//!
//! Core types for the storefront cart.
//!
//! This crate provides:
//! - `Cart` and `LineItem`: the cart store and its merge/persist rules
//! - `CartStorage` and the in-memory `MemoryStorage` backend
//! - `CartObserver` for wiring presentation to cart changes
//! - `Product` and `ProductCatalog` for the read-only catalog
//! - `CheckoutPayload`, `ShippingPolicy`, `CheckoutSession` for checkout
//! - `PaymentStrategy` trait for payment providers
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{AddToCart, Cart, Currency, MemoryStorage, ProductCatalog};
//!
//! let catalog = ProductCatalog::from_toml(&std::fs::read_to_string("config/products.toml")?)?;
//! let mut cart = Cart::load(MemoryStorage::new(), "cart", Currency::GBP);
//!
//! cart.add_product(&catalog, AddToCart::new("london-gins-tasting-gift"))?;
//! println!("{} items, {}", cart.count(), cart.total().display());
//!
//! // POST this to the session-creation endpoint
//! let payload = cart.checkout_payload()?;
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod product;
pub mod storage;
pub mod strategy;

// Re-exports for convenience
pub use cart::{AddToCart, Cart, CartEvent, CartObserver, CartSummary, LineItem};
pub use checkout::{
    CheckoutItem, CheckoutPayload, CheckoutSession, DeliveryBound, DeliveryUnit, SessionRequest,
    ShippingPolicy, ShippingRate,
};
pub use error::{CartError, CartResult};
pub use product::{Currency, Price, Product, ProductCatalog};
pub use storage::{CartStorage, MemoryStorage, DEFAULT_CART_KEY, LEGACY_CART_KEY};
pub use strategy::{BoxedPaymentStrategy, CheckoutUrls, PaymentStrategy};
