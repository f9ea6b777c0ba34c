//! # cart-api
//!
//! HTTP API layer for the storefront cart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The checkout session-creation endpoint
//! - Read-only catalog endpoints
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/create-checkout-session` | Create checkout session (other verbs: 405) |
//! | POST | `/.netlify/functions/create-checkout-session` | Same, legacy path |
//! | GET | `/api/v1/products` | List products |
//! | GET | `/api/v1/products/{id}` | Get product |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
