//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment strategy, catalog, shipping policy and redirect URLs.

use anyhow::Context;
use cart_core::{BoxedPaymentStrategy, CheckoutUrls, ProductCatalog, ShippingPolicy};
use cart_stripe::StripeCheckoutStrategy;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public storefront URL used for success/cancel redirects
    pub site_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding `products.toml` and `shipping.toml`
    pub config_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from environment variables
    ///
    /// `SITE_URL` wins over `URL` (the variable Netlify sets for deploys).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8888),
            site_url: std::env::var("SITE_URL")
                .or_else(|_| std::env::var("URL"))
                .unwrap_or_else(|_| "http://localhost:8888".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            config_dir: std::env::var("CART_CONFIG_DIR").ok().map(PathBuf::from),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider
    pub strategy: BoxedPaymentStrategy,
    /// Product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Shipping countries and rate attached to every session
    pub shipping: ShippingPolicy,
    /// Checkout redirect URLs
    pub urls: CheckoutUrls,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by Stripe, reading everything from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let catalog = load_product_catalog(config.config_dir.as_deref())?;
        let shipping = load_shipping_policy(config.config_dir.as_deref())?;

        Ok(Self::new(config, Arc::new(stripe), catalog, shipping))
    }

    /// Assemble state from parts
    pub fn new(
        config: AppConfig,
        strategy: BoxedPaymentStrategy,
        catalog: ProductCatalog,
        shipping: ShippingPolicy,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.site_url);
        Self {
            strategy,
            catalog: Arc::new(catalog),
            shipping,
            urls,
            config,
        }
    }
}

/// Read `name` from the config dir, or from the usual relative locations
fn read_config_file(dir: Option<&Path>, name: &str) -> Option<(PathBuf, String)> {
    let candidates: Vec<PathBuf> = match dir {
        Some(dir) => vec![dir.join(name)],
        None => ["config", "../config", "../../config"]
            .iter()
            .map(|d| Path::new(d).join(name))
            .collect(),
    };

    candidates.into_iter().find_map(|path| {
        std::fs::read_to_string(&path)
            .ok()
            .map(|content| (path, content))
    })
}

/// Load product catalog from `products.toml`
fn load_product_catalog(dir: Option<&Path>) -> anyhow::Result<ProductCatalog> {
    match read_config_file(dir, "products.toml") {
        Some((path, content)) => {
            let catalog = ProductCatalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::info!("Loaded {} products from {}", catalog.len(), path.display());
            Ok(catalog)
        }
        None => {
            tracing::warn!("No product catalog found, using empty catalog");
            Ok(ProductCatalog::new())
        }
    }
}

/// Load shipping policy from `shipping.toml`, defaulting when absent
fn load_shipping_policy(dir: Option<&Path>) -> anyhow::Result<ShippingPolicy> {
    match read_config_file(dir, "shipping.toml") {
        Some((path, content)) => ShippingPolicy::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display())),
        None => {
            tracing::info!("No shipping.toml found, using default shipping policy");
            Ok(ShippingPolicy::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            site_url: "https://shop.example.com".to_string(),
            environment: "test".to_string(),
            config_dir: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..config()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let catalog =
            ProductCatalog::from_toml(include_str!("../../../config/products.toml")).unwrap();
        assert_eq!(catalog.len(), 16);
        assert!(catalog.products.iter().all(|p| p.is_purchasable()));

        let shipping =
            ShippingPolicy::from_toml(include_str!("../../../config/shipping.toml")).unwrap();
        assert_eq!(shipping, ShippingPolicy::default());
    }

    #[test]
    fn test_load_config_files_from_dir() {
        let dir = std::env::temp_dir().join(format!("cart-api-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("products.toml"),
            r#"
            [[products]]
            id = "yorkshire-gin-gift-set"
            name = "Yorkshire Gin Gift Set"
            price = { amount = 5200, currency = "gbp" }
            price_id = "price_yorkshire"
            "#,
        )
        .unwrap();

        let catalog = load_product_catalog(Some(&dir)).unwrap();
        assert!(catalog.get("yorkshire-gin-gift-set").is_some());

        let shipping = load_shipping_policy(Some(&dir)).unwrap();
        assert_eq!(shipping, ShippingPolicy::default());

        std::fs::write(dir.join("products.toml"), "[[products]]\nid = 3").unwrap();
        assert!(load_product_catalog(Some(&dir)).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
