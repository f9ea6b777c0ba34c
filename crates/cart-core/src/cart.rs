//! # Cart Store
//!
//! The cart owns an ordered list of line items and the storage slot they are
//! persisted to. Every mutation rewrites the whole list to storage and then
//! tells registered observers, which is where presentation (badge counts,
//! "added to cart" toasts) hooks in. A mutation whose write fails leaves the
//! cart as it was.
//!
//! ```rust,ignore
//! use cart_core::{Cart, Currency, MemoryStorage, AddToCart};
//!
//! let mut cart = Cart::load(MemoryStorage::new(), "cart", Currency::GBP);
//! cart.add_product(&catalog, AddToCart::new("london-gins-tasting-gift"))?;
//! assert_eq!(cart.count(), 1);
//! ```

use crate::checkout::CheckoutPayload;
use crate::error::{CartError, CartResult};
use crate::product::{Currency, Price, ProductCatalog};
use crate::storage::CartStorage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One product entry in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product key, unique within the cart
    pub id: String,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price
    pub price: Price,

    /// Image URL
    #[serde(default)]
    pub image: String,

    /// Quantity, always >= 1 while in the cart
    pub quantity: u32,

    /// Price reference registered with the payment provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: String::new(),
            quantity: 1,
            price_id: None,
        }
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = url.into();
        self
    }

    /// Builder: set the provider price reference
    pub fn with_price_id(mut self, price_id: impl Into<String>) -> Self {
        self.price_id = Some(price_id.into());
        self
    }

    /// Calculate the total price for this line item
    pub fn total(&self) -> Price {
        self.price.times(self.quantity)
    }

    fn has_price_reference(&self) -> bool {
        self.price_id.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Request to add a product, with any field the caller omitted filled in
/// from the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddToCart {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl AddToCart {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quantity: 1,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn with_price_id(mut self, price_id: impl Into<String>) -> Self {
        self.price_id = Some(price_id.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// What a mutation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    /// Item added or its quantity incremented; `quantity` is the new line quantity
    ItemAdded {
        id: String,
        name: String,
        quantity: u32,
    },
    ItemRemoved { id: String },
    QuantityChanged { id: String, quantity: u32 },
    Cleared,
}

/// Snapshot handed to observers after every persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of quantities
    pub count: u32,
    /// Number of distinct line items
    pub lines: usize,
    pub total: Price,
}

/// Presentation hook for cart changes.
///
/// All methods default to no-ops; implement the ones the UI needs.
#[allow(unused_variables)]
pub trait CartObserver {
    /// Called after an add has been persisted (confirmation toast)
    fn on_item_added(&self, item: &LineItem, quantity_added: u32) {}

    /// Called after a removal has been persisted
    fn on_item_removed(&self, id: &str) {}

    /// Called after every persist (badge / display refresh)
    fn on_cart_changed(&self, summary: &CartSummary) {}
}

/// The cart store
pub struct Cart<S: CartStorage> {
    storage: S,
    key: String,
    currency: Currency,
    items: Vec<LineItem>,
    observers: Vec<Box<dyn CartObserver>>,
}

impl<S: CartStorage> Cart<S> {
    /// Rehydrate a cart from `key` in `storage`.
    ///
    /// Missing or unreadable data yields an empty cart; this never fails.
    pub fn load(storage: S, key: impl Into<String>, currency: Currency) -> Self {
        let key = key.into();
        let items = read_items(&storage, &key, currency);
        Self {
            storage,
            key,
            currency,
            items,
            observers: Vec::new(),
        }
    }

    /// Load from `key`, adopting a cart left under `legacy_key` when `key`
    /// has never been written.
    ///
    /// A migrated cart is rewritten under `key` and the legacy slot removed.
    /// If the rewrite fails the legacy slot is kept for the next load.
    pub fn load_or_migrate(
        storage: S,
        key: impl Into<String>,
        legacy_key: &str,
        currency: Currency,
    ) -> Self {
        let mut cart = Self::load(storage, key, currency);
        if cart.key == legacy_key || cart.storage.load(&cart.key).is_some() {
            return cart;
        }

        let items = read_items(&cart.storage, legacy_key, currency);
        if items.is_empty() {
            return cart;
        }
        let lines = items.len();
        match cart.commit(items) {
            Ok(()) => {
                info!("Migrated {} cart lines from {} to {}", lines, legacy_key, cart.key);
                if let Err(e) = cart.storage.remove(legacy_key) {
                    warn!("Could not remove legacy cart slot {}: {}", legacy_key, e);
                }
            }
            Err(e) => warn!("Could not migrate cart from {}: {}", legacy_key, e),
        }
        cart
    }

    /// Re-read the persisted slot, discarding in-memory state
    pub fn reload(&mut self) {
        self.items = read_items(&self.storage, &self.key, self.currency);
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: Box<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// Builder: register an observer
    pub fn with_observer(mut self, observer: Box<dyn CartObserver>) -> Self {
        self.subscribe(observer);
        self
    }

    /// Add `quantity` of `item`, merging with an existing line of the same id
    pub fn add(&mut self, item: LineItem, quantity: u32) -> CartResult<CartEvent> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity {
                product_id: item.id,
                quantity: 0,
            });
        }
        if !item.has_price_reference() {
            warn!("Refusing to add {}: no price reference", item.id);
            return Err(CartError::MissingPriceReference {
                product_id: item.id,
            });
        }
        if item.price.currency != self.currency {
            return Err(CartError::CurrencyMismatch {
                expected: self.currency.to_string(),
                found: item.price.currency.to_string(),
            });
        }

        let mut items = self.items.clone();
        let index = match self.position(&item.id) {
            Some(index) => {
                let line = &mut items[index];
                line.quantity = line.quantity.saturating_add(quantity);
                index
            }
            None => {
                items.push(LineItem { quantity, ..item });
                items.len() - 1
            }
        };

        self.commit(items)?;

        let line = &self.items[index];
        for observer in &self.observers {
            observer.on_item_added(line, quantity);
        }

        Ok(CartEvent::ItemAdded {
            id: line.id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
        })
    }

    /// Add a product by key, filling omitted fields from the catalog.
    ///
    /// Fails with `MissingPriceReference` when neither the request nor the
    /// catalog supplies a price reference.
    pub fn add_product(
        &mut self,
        catalog: &ProductCatalog,
        request: AddToCart,
    ) -> CartResult<CartEvent> {
        let product = catalog.get(&request.id);

        let price_id = request
            .price_id
            .filter(|p| !p.is_empty())
            .or_else(|| product.and_then(|p| p.price_id.clone()));
        let Some(price_id) = price_id else {
            warn!(
                "No price reference for {} ({} products in catalog)",
                request.id,
                catalog.len()
            );
            return Err(CartError::MissingPriceReference {
                product_id: request.id,
            });
        };

        let not_found = || CartError::ProductNotFound {
            product_id: request.id.clone(),
        };
        let name = request
            .name
            .clone()
            .or_else(|| product.map(|p| p.name.clone()))
            .ok_or_else(not_found)?;
        let price = request
            .price
            .or_else(|| product.map(|p| p.price))
            .ok_or_else(not_found)?;
        let image = request
            .image
            .clone()
            .or_else(|| product.and_then(|p| p.image_url.clone()))
            .unwrap_or_default();

        let item = LineItem {
            id: request.id.clone(),
            name,
            price,
            image,
            quantity: request.quantity,
            price_id: Some(price_id),
        };
        self.add(item, request.quantity)
    }

    /// Remove the line with `id`. Persists even when nothing matched.
    pub fn remove(&mut self, id: &str) -> CartResult<Option<CartEvent>> {
        let mut items = self.items.clone();
        let removed = self.position(id).map(|index| items.remove(index));
        self.commit(items)?;

        Ok(removed.map(|item| {
            for observer in &self.observers {
                observer.on_item_removed(&item.id);
            }
            CartEvent::ItemRemoved { id: item.id }
        }))
    }

    /// Overwrite the quantity for `id`; `quantity <= 0` removes the line.
    /// Does nothing when `id` is not in the cart.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> CartResult<Option<CartEvent>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        if quantity <= 0 {
            return self.remove(id);
        }

        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity {
            product_id: id.to_string(),
            quantity,
        })?;
        let mut items = self.items.clone();
        items[index].quantity = quantity;
        self.commit(items)?;

        Ok(Some(CartEvent::QuantityChanged {
            id: id.to_string(),
            quantity,
        }))
    }

    /// Empty the cart
    pub fn clear(&mut self) -> CartResult<CartEvent> {
        self.commit(Vec::new())?;
        Ok(CartEvent::Cleared)
    }

    /// Sum of unit price x quantity
    pub fn total(&self) -> Price {
        let amount = self
            .items
            .iter()
            .fold(0_i64, |acc, item| acc.saturating_add(item.total().amount));
        Price::from_minor(amount, self.currency)
    }

    /// Sum of quantities
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            count: self.count(),
            lines: self.items.len(),
            total: self.total(),
        }
    }

    /// Write the full item list to storage and refresh observers
    pub fn persist(&mut self) -> CartResult<()> {
        self.commit(self.items.clone())
    }

    /// Write `items` to storage, then adopt them and refresh observers.
    /// On a failed write the current items are left untouched.
    fn commit(&mut self, items: Vec<LineItem>) -> CartResult<()> {
        let json = serde_json::to_string(&items)?;
        self.storage.save(&self.key, &json)?;
        debug!("Saved {} cart lines to {}", items.len(), self.key);
        self.items = items;

        let summary = self.summary();
        for observer in &self.observers {
            observer.on_cart_changed(&summary);
        }
        Ok(())
    }

    /// Payload for the session-creation endpoint
    pub fn checkout_payload(&self) -> CartResult<CheckoutPayload> {
        CheckoutPayload::from_items(&self.items)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the cart, returning its storage backend
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Persisted line as read back. Also accepts lines written by the storefront
/// script, which used `priceId` and a decimal `price`.
#[derive(Deserialize)]
struct StoredLine {
    id: String,
    name: String,
    price: StoredPrice,
    #[serde(default)]
    image: String,
    quantity: u32,
    #[serde(default, alias = "priceId")]
    price_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPrice {
    Minor(Price),
    /// Decimal amount in the cart's currency
    Decimal(f64),
}

impl StoredLine {
    fn into_line_item(self, currency: Currency) -> LineItem {
        let price = match self.price {
            StoredPrice::Minor(price) => price,
            StoredPrice::Decimal(amount) => Price::new(amount, currency),
        };
        LineItem {
            id: self.id,
            name: self.name,
            price,
            image: self.image,
            quantity: self.quantity,
            price_id: self.price_id,
        }
    }
}

/// Read and normalize the persisted item list.
///
/// Zero quantities and foreign-currency lines are dropped, repeated ids are
/// merged into the first occurrence.
fn read_items<S: CartStorage>(storage: &S, key: &str, currency: Currency) -> Vec<LineItem> {
    let Some(raw) = storage.load(key) else {
        return Vec::new();
    };

    let stored: Vec<StoredLine> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Discarding unreadable cart in slot {}: {}", key, e);
            return Vec::new();
        }
    };

    let mut items: Vec<LineItem> = Vec::with_capacity(stored.len());
    for item in stored.into_iter().map(|line| line.into_line_item(currency)) {
        if item.quantity == 0 {
            continue;
        }
        if item.price.currency != currency {
            warn!(
                "Dropping {} from stored cart: priced in {}, cart is {}",
                item.id, item.price.currency, currency
            );
            continue;
        }
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
    }
    items
}
