//! # Payment Strategy Trait
//!
//! Seam between the session-creation endpoint and the hosted payment
//! provider. The endpoint only ever talks to `dyn PaymentStrategy`, so the
//! provider can be swapped (or mocked in tests) without touching the HTTP
//! layer.
//!
//! ```text
//!   POST /api/create-checkout-session
//!              │
//!              ▼
//!   ┌───────────────────────────┐
//!   │ PaymentStrategy (trait)   │
//!   │  └── create_checkout()    │
//!   └───────────────────────────┘
//!              ▲
//!   ┌──────────┴──────────┐
//!   │StripeCheckoutStrategy│
//!   └─────────────────────┘
//! ```

use crate::checkout::{CheckoutSession, SessionRequest};
use crate::error::CartResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session for the request.
    ///
    /// # Returns
    /// A `CheckoutSession` whose `session_id` is relayed to the browser.
    async fn create_checkout(&self, request: &SessionRequest) -> CartResult<CheckoutSession>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Redirect URLs handed to the payment provider
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the storefront (e.g., "https://azuspirits.co.uk")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path (back to the cart)
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            success_path: "/success.html".to_string(),
            cancel_path: "/cart.html".to_string(),
        }
    }

    /// Success URL carrying the provider's session id placeholder
    pub fn success_url(&self) -> String {
        format!(
            "{}{}?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url, self.success_path
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:8888")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutItem, CheckoutPayload, ShippingPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::new("https://shop.example.com/");

        assert_eq!(
            urls.success_url(),
            "https://shop.example.com/success.html?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(urls.cancel_url(), "https://shop.example.com/cart.html");
    }

    struct CountingStrategy {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentStrategy for CountingStrategy {
        async fn create_checkout(&self, request: &SessionRequest) -> CartResult<CheckoutSession> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            request.payload.validate()?;
            Ok(CheckoutSession::new("cs_test_1", self.provider_name()))
        }

        fn provider_name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_strategy_behind_arc() {
        let strategy: BoxedPaymentStrategy = Arc::new(CountingStrategy {
            calls: AtomicUsize::new(0),
        });
        let urls = CheckoutUrls::default();
        let request = SessionRequest {
            payload: CheckoutPayload {
                items: vec![CheckoutItem {
                    price: "price_a".into(),
                    quantity: 1,
                }],
            },
            success_url: urls.success_url(),
            cancel_url: urls.cancel_url(),
            shipping: ShippingPolicy::default(),
        };

        let session = strategy.create_checkout(&request).await.unwrap();
        assert_eq!(session.session_id, "cs_test_1");
        assert_eq!(session.provider, "counting");
    }
}
