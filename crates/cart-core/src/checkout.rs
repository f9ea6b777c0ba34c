//! # Checkout Types
//!
//! The checkout payload sent from the cart to the session-creation endpoint,
//! the shipping policy attached to every session, and the session the
//! payment provider hands back.
//!
//! Line items are reference-based: each one names a price already registered
//! with the payment provider, plus a quantity.

use crate::cart::LineItem;
use crate::error::{CartError, CartResult};
use crate::product::{Currency, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One purchasable line, as the payment provider expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    /// Provider price reference (`price_...`)
    pub price: String,
    pub quantity: u32,
}

/// Body of a session-creation request: `{"items": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPayload {
    pub items: Vec<CheckoutItem>,
}

impl CheckoutPayload {
    /// Map cart lines to checkout items.
    ///
    /// Every line must carry a price reference; an empty cart is rejected.
    pub fn from_items(items: &[LineItem]) -> CartResult<Self> {
        if items.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let items = items
            .iter()
            .map(|item| match item.price_id.as_deref() {
                Some(price) if !price.is_empty() => Ok(CheckoutItem {
                    price: price.to_string(),
                    quantity: item.quantity,
                }),
                _ => Err(CartError::MissingPriceReference {
                    product_id: item.id.clone(),
                }),
            })
            .collect::<CartResult<Vec<_>>>()?;

        Ok(Self { items })
    }

    /// Check the payload is something the provider can accept
    pub fn validate(&self) -> CartResult<()> {
        if self.items.is_empty() {
            return Err(CartError::EmptyCart);
        }
        for item in &self.items {
            if item.price.is_empty() {
                return Err(CartError::InvalidRequest(
                    "Checkout item is missing a price reference".to_string(),
                ));
            }
            if item.quantity == 0 {
                return Err(CartError::InvalidQuantity {
                    product_id: item.price.clone(),
                    quantity: 0,
                });
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

/// Unit for delivery estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryUnit {
    Hour,
    Day,
    BusinessDay,
    Week,
    Month,
}

impl DeliveryUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryUnit::Hour => "hour",
            DeliveryUnit::Day => "day",
            DeliveryUnit::BusinessDay => "business_day",
            DeliveryUnit::Week => "week",
            DeliveryUnit::Month => "month",
        }
    }
}

/// One bound of a delivery estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryBound {
    pub unit: DeliveryUnit,
    pub value: u32,
}

/// Flat-rate shipping option offered at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub display_name: String,
    /// Fixed amount charged for the rate
    pub amount: Price,
    pub minimum: DeliveryBound,
    pub maximum: DeliveryBound,
}

impl Default for ShippingRate {
    fn default() -> Self {
        Self {
            display_name: "Standard Delivery".to_string(),
            amount: Price::zero(Currency::GBP),
            minimum: DeliveryBound {
                unit: DeliveryUnit::BusinessDay,
                value: 3,
            },
            maximum: DeliveryBound {
                unit: DeliveryUnit::BusinessDay,
                value: 5,
            },
        }
    }
}

/// Where we ship and what it costs (loaded from `config/shipping.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// ISO 3166-1 alpha-2 country codes
    #[serde(default = "default_countries")]
    pub allowed_countries: Vec<String>,

    #[serde(default)]
    pub rate: ShippingRate,
}

fn default_countries() -> Vec<String> {
    ["GB", "US", "CA", "AU"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            allowed_countries: default_countries(),
            rate: ShippingRate::default(),
        }
    }
}

impl ShippingPolicy {
    /// Load a policy from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Everything the payment provider needs to open a session
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub payload: CheckoutPayload,
    pub success_url: String,
    pub cancel_url: String,
    pub shipping: ShippingPolicy,
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's opaque session ID
    pub session_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// Hosted checkout URL, when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,

    /// When the session expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(session_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            provider: provider.into(),
            checkout_url: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }
}
