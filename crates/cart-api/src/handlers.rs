//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//!
//! The session endpoint reads the raw body itself so that a malformed
//! payload is reported as a server error carrying the parse message, the
//! same way a failed provider call is.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use cart_core::{CartError, CheckoutPayload, SessionRequest};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Session-creation response
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    /// Opaque session id from the payment provider
    pub id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn server_error(message: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message, 500)),
    )
}

fn cart_error_to_response(err: CartError) -> ApiError {
    let code = err.status_code();
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse::new(err.to_string(), code)),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cart-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session from `{"items": [{"price", "quantity"}]}`
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload: CheckoutPayload = serde_json::from_slice(&body).map_err(|e| {
        error!("Error parsing checkout request: {}", e);
        server_error(e.to_string())
    })?;

    info!(
        "Creating checkout session: {} lines, {} units",
        payload.items.len(),
        payload.item_count()
    );

    let request = SessionRequest {
        payload,
        success_url: state.urls.success_url(),
        cancel_url: state.urls.cancel_url(),
        shipping: state.shipping.clone(),
    };

    let session = state
        .strategy
        .create_checkout(&request)
        .await
        .map_err(|e| {
            error!("Error creating checkout session: {}", e);
            server_error(e.to_string())
        })?;

    info!(
        "Created {} checkout session: {}",
        session.provider, session.session_id
    );

    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(CreateSessionResponse {
            id: session.session_id,
        }),
    ))
}

/// Any verb other than POST on the session endpoint. The body is never read.
pub async fn method_not_allowed() -> ApiError {
    warn!("Rejected non-POST request to checkout session endpoint");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed", 405)),
    )
}

/// Get products list
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<_> = state.catalog.active_products().collect();
    Json(serde_json::json!({
        "products": products,
        "count": products.len()
    }))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog.get(&product_id).ok_or_else(|| {
        cart_error_to_response(CartError::ProductNotFound {
            product_id: product_id.clone(),
        })
    })?;

    Ok(Json(product.clone()))
}
