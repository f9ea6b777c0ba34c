//! # Product Types
//!
//! Product catalog types for the storefront cart.
//! Products are loaded from `config/products.toml` and treated as read-only
//! reference data: the cart only consults them to fill in fields a caller
//! left out when adding an item.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    GBP,
    USD,
    EUR,
    CAD,
    AUD,
    JPY,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::GBP => "gbp",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
            Currency::JPY => "jpy",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, most others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (pence, cents)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::GBP => "£",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::JPY => "¥",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (pence for GBP)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a new price from decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
        }
    }

    /// Create a price from smallest unit (pence)
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Price of `quantity` units at this price
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount.saturating_mul(i64::from(quantity)),
            currency: self.currency,
        }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Format for display (e.g., "£52.00")
    pub fn display(&self) -> String {
        let symbol = self.currency.symbol();
        if self.currency.decimal_places() == 0 {
            format!("{}{}", symbol, self.amount)
        } else {
            format!("{}{:.2}", symbol, self.as_decimal())
        }
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product key (e.g., "london-gins-tasting-gift")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Unit price
    pub price: Price,

    /// Image URL shown in the cart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Price reference registered with the payment provider (`price_...`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            image_url: None,
            price_id: None,
            active: true,
        }
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Builder: set the provider price reference
    pub fn with_price_id(mut self, price_id: impl Into<String>) -> Self {
        self.price_id = Some(price_id.into());
        self
    }

    /// Check if this product can be sent to checkout
    pub fn is_purchasable(&self) -> bool {
        self.active && self.price_id.is_some()
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Builder: add a product
    pub fn with_product(mut self, product: Product) -> Self {
        self.add(product);
        self
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_conversion() {
        let gbp = Currency::GBP;
        assert_eq!(gbp.to_smallest_unit(52.0), 5200);
        assert_eq!(gbp.to_smallest_unit(10.99), 1099);
        assert_eq!(gbp.from_smallest_unit(1099), 10.99);

        let jpy = Currency::JPY;
        assert_eq!(jpy.to_smallest_unit(1000.0), 1000);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::new(52.0, Currency::GBP).display(), "£52.00");
        assert_eq!(Price::new(19.99, Currency::USD).display(), "$19.99");
        assert_eq!(Price::from_minor(500, Currency::JPY).display(), "¥500");
    }

    #[test]
    fn test_price_times() {
        let price = Price::new(52.0, Currency::GBP);
        assert_eq!(price.times(2).amount, 10400);
        assert_eq!(price.times(0), Price::zero(Currency::GBP));
    }

    #[test]
    fn test_product_builder() {
        let product = Product::new(
            "devon-gins-tasting-gift",
            "Devon Gins Tasting Set",
            Price::new(52.0, Currency::GBP),
        )
        .with_image("/images/products/devon-gin-tasting.jpg")
        .with_price_id("price_devon");

        assert_eq!(product.id, "devon-gins-tasting-gift");
        assert!(product.is_purchasable());
        assert!(!Product::new("x", "X", Price::zero(Currency::GBP)).is_purchasable());
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = ProductCatalog::from_toml(
            r#"
            [[products]]
            id = "london-gins-tasting-gift"
            name = "London Gin Tasting Set"
            price = { amount = 5200, currency = "gbp" }
            image_url = "/images/products/london-gins.jpg"
            price_id = "price_london"

            [[products]]
            id = "retired-set"
            name = "Retired Set"
            price = { amount = 4000, currency = "gbp" }
            active = false
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let london = catalog.get("london-gins-tasting-gift").unwrap();
        assert_eq!(london.price, Price::from_minor(5200, Currency::GBP));
        assert_eq!(london.price_id.as_deref(), Some("price_london"));
        assert_eq!(catalog.active_products().count(), 1);
        assert!(catalog.get("missing").is_none());
    }
}
