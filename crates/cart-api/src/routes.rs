//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Path the storefront posts carts to
pub const CHECKOUT_SESSION_PATH: &str = "/api/create-checkout-session";

/// Same endpoint under the serverless-functions path the storefront pages
/// were originally deployed against
pub const FUNCTION_SESSION_PATH: &str = "/.netlify/functions/create-checkout-session";

/// Create the main application router
///
/// Routes:
/// - POST /api/create-checkout-session - Create checkout session
/// - POST /.netlify/functions/create-checkout-session - Same, legacy path
/// - GET  /api/v1/products - List active products
/// - GET  /api/v1/products/{id} - Get product by ID
/// - GET  /health - Health check
pub fn create_router(state: AppState) -> Router {
    // Storefront pages may be served from a different origin (CDN, preview deploys)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product));

    Router::new()
        .route("/health", get(handlers::health))
        .route(CHECKOUT_SESSION_PATH, session_route())
        .route(FUNCTION_SESSION_PATH, session_route())
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// POST creates a session; every other verb gets a 405 with a JSON body
fn session_route() -> MethodRouter<AppState> {
    post(handlers::create_checkout_session).fallback(handlers::method_not_allowed)
}
