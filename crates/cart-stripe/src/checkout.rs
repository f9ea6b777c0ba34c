//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API for reference-based
//! line items. The cart sends registered price ids; Stripe owns the product
//! details.

use crate::config::StripeConfig;
use async_trait::async_trait;
use cart_core::{
    CartError, CartResult, CheckoutSession, PaymentStrategy, SessionRequest, ShippingPolicy,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page, so card data never touches us.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CartError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        if config.is_test_mode() {
            info!("Stripe checkout configured with test keys");
        } else {
            info!("Stripe checkout configured with live keys");
        }
        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }
}

/// Form-encoded parameters for `POST /v1/checkout/sessions`
fn session_form_params(request: &SessionRequest) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, item) in request.payload.items.iter().enumerate() {
        params.push((format!("line_items[{}][price]", i), item.price.clone()));
        params.push((
            format!("line_items[{}][quantity]", i),
            item.quantity.to_string(),
        ));
    }

    push_shipping_params(&mut params, &request.shipping);
    params
}

fn push_shipping_params(params: &mut Vec<(String, String)>, shipping: &ShippingPolicy) {
    for (i, country) in shipping.allowed_countries.iter().enumerate() {
        params.push((
            format!("shipping_address_collection[allowed_countries][{}]", i),
            country.clone(),
        ));
    }

    let rate = &shipping.rate;
    let prefix = "shipping_options[0][shipping_rate_data]";
    params.push((format!("{}[type]", prefix), "fixed_amount".to_string()));
    params.push((
        format!("{}[fixed_amount][amount]", prefix),
        rate.amount.amount.to_string(),
    ));
    params.push((
        format!("{}[fixed_amount][currency]", prefix),
        rate.amount.currency.as_str().to_string(),
    ));
    params.push((format!("{}[display_name]", prefix), rate.display_name.clone()));
    for (bound, estimate) in [("minimum", rate.minimum), ("maximum", rate.maximum)] {
        params.push((
            format!("{}[delivery_estimate][{}][unit]", prefix, bound),
            estimate.unit.as_str().to_string(),
        ));
        params.push((
            format!("{}[delivery_estimate][{}][value]", prefix, bound),
            estimate.value.to_string(),
        ));
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request), fields(items = request.payload.items.len()))]
    async fn create_checkout(&self, request: &SessionRequest) -> CartResult<CheckoutSession> {
        request.payload.validate()?;

        let form_params = session_form_params(request);
        debug!(
            "Creating Stripe checkout session: {} items, {} params",
            request.payload.item_count(),
            form_params.len()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(CartError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(CartError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                CartError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!("Created Stripe checkout session: id={}", session_response.id);

        Ok(CheckoutSession {
            session_id: session_response.id,
            provider: PROVIDER.to_string(),
            checkout_url: session_response.url,
            expires_at: session_response
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
