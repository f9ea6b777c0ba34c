//! # Cart Error Types
//!
//! Typed error handling for the storefront cart.
//! Cart operations and checkout calls return `Result<T, CartError>`.

use thiserror::Error;

/// Core error type for cart and checkout operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Product has no price registered with the payment provider
    #[error("Product {product_id} has no price reference and cannot be checked out")]
    MissingPriceReference { product_id: String },

    /// Quantity outside the allowed range
    #[error("Invalid quantity {quantity} for {product_id}")]
    InvalidQuantity { product_id: String, quantity: i64 },

    /// Item priced in a different currency than the cart
    #[error("Currency mismatch: cart is {expected}, item is {found}")]
    CurrencyMismatch { expected: String, found: String },

    /// Checkout attempted with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// Persisted storage could not be written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CartError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::InvalidRequest(_) => 400,
            CartError::ProductNotFound { .. } => 404,
            CartError::MissingPriceReference { .. } => 422,
            CartError::InvalidQuantity { .. } => 400,
            CartError::CurrencyMismatch { .. } => 400,
            CartError::EmptyCart => 400,
            CartError::Storage(_) => 500,
            CartError::ProviderError { .. } => 502,
            CartError::NetworkError(_) => 503,
            CartError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::Serialization(err.to_string())
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;
