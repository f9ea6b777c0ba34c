//! # cart-stripe
//!
//! Stripe payment strategy for the storefront cart.
//!
//! `StripeCheckoutStrategy` opens a hosted Checkout Session from a cart's
//! reference-based line items, attaching the shipping country allowlist and
//! a flat-rate shipping option.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_stripe::StripeCheckoutStrategy;
//! use cart_core::{CheckoutUrls, PaymentStrategy, SessionRequest, ShippingPolicy};
//!
//! // Create strategy from environment
//! let strategy = StripeCheckoutStrategy::from_env()?;
//!
//! let urls = CheckoutUrls::new("https://shop.example.com");
//! let session = strategy.create_checkout(&SessionRequest {
//!     payload: cart.checkout_payload()?,
//!     success_url: urls.success_url(),
//!     cancel_url: urls.cancel_url(),
//!     shipping: ShippingPolicy::default(),
//! }).await?;
//!
//! // Hand session.session_id back to the browser
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
