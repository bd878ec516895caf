//! Cart ledger
//!
//! The ledger owns the line items of a single sale session. Every present line satisfies
//! `1 <= quantity <= stock_ceiling`: requests outside that range are clamped rather than
//! rejected, and a line whose quantity would reach zero is removed.
//!
//! A ledger is a plain value with no interior locking. Concurrent sessions each own their
//! own ledger; sharing one across threads needs an external mutex.

use decimal_percentage::Percentage;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    pricing::{ExactAmount, Price, PricingError, line_total, total_price},
    products::{ProductDescriptor, ProductId},
};

/// Errors related to ledger operations.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// The product has no stock to sell.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The product is not in the ledger.
    #[error("product {0} is not in the ledger")]
    NotFound(ProductId),

    /// The product is priced in a different currency from the ledger.
    #[error("Product {product} has currency {actual}, but ledger has currency {expected}")]
    CurrencyMismatch {
        /// Offending product
        product: ProductId,
        /// Ledger currency code
        expected: &'static str,
        /// Product currency code
        actual: &'static str,
    },

    /// Money arithmetic failed while deriving totals.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One product's entry in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    product: ProductId,
    name: String,
    unit_price: Price,
    stock_ceiling: u32,
    quantity: u32,
}

impl LineItem {
    /// Product id
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Display label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price captured when the line was added
    pub fn unit_price(&self) -> &Price {
        &self.unit_price
    }

    /// Maximum quantity for this line
    pub fn stock_ceiling(&self) -> u32 {
        self.stock_ceiling
    }

    /// Current quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn line_total(&self) -> Result<Price, PricingError> {
        line_total(&self.unit_price, self.quantity)
    }
}

/// Result of [`Ledger::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was inserted with this quantity.
    Inserted {
        /// Quantity after clamping
        quantity: u32,
    },

    /// The product already had a line; nothing changed.
    AlreadyPresent {
        /// Quantity of the existing line
        quantity: u32,
    },
}

/// Result of [`Ledger::update_quantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityUpdate {
    /// The line was kept with a new (possibly clamped) quantity.
    Updated(LineItem),

    /// The requested quantity was zero or less, so the line was removed.
    Removed(LineItem),
}

/// Cart ledger
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    items: Vec<LineItem>,
    currency: &'static Currency,
}

impl Ledger {
    /// Create an empty ledger in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// See [`Ledger::add_with_quantity`].
    pub fn add(&mut self, product: &ProductDescriptor) -> Result<AddOutcome, LedgerError> {
        self.add_with_quantity(product, 1)
    }

    /// Add a product with a requested quantity, clamped into `1..=stock_ceiling`.
    ///
    /// Adding a product that already has a line is a no-op; use
    /// [`Ledger::update_quantity`] to change it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::OutOfStock`]: the product's stock ceiling is zero.
    /// - [`LedgerError::CurrencyMismatch`]: the product is priced in another currency.
    pub fn add_with_quantity(
        &mut self,
        product: &ProductDescriptor,
        requested_quantity: i64,
    ) -> Result<AddOutcome, LedgerError> {
        if product.stock_ceiling < 1 {
            warn!(product = %product.id, "rejected add of out-of-stock product");

            return Err(LedgerError::OutOfStock(product.id.clone()));
        }

        let product_currency = product.unit_price.currency();
        if product_currency != self.currency {
            return Err(LedgerError::CurrencyMismatch {
                product: product.id.clone(),
                expected: self.currency.iso_alpha_code,
                actual: product_currency.iso_alpha_code,
            });
        }

        if let Some(existing) = self.get(&product.id) {
            debug!(
                product = %product.id,
                quantity = existing.quantity,
                "add ignored, already present"
            );

            return Ok(AddOutcome::AlreadyPresent {
                quantity: existing.quantity,
            });
        }

        let quantity = clamp_quantity(requested_quantity, product.stock_ceiling);

        self.items.push(LineItem {
            product: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            stock_ceiling: product.stock_ceiling,
            quantity,
        });

        debug!(product = %product.id, requested_quantity, quantity, "line added");

        Ok(AddOutcome::Inserted { quantity })
    }

    /// Set a line's quantity. Zero or less removes the line; anything above the stock
    /// ceiling saturates at the ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the product has no line.
    pub fn update_quantity(
        &mut self,
        id: &ProductId,
        new_quantity: i64,
    ) -> Result<QuantityUpdate, LedgerError> {
        if new_quantity <= 0 {
            return self.remove(id).map(QuantityUpdate::Removed);
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| &item.product == id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        item.quantity = clamp_quantity(new_quantity, item.stock_ceiling);

        debug!(
            product = %id,
            requested_quantity = new_quantity,
            quantity = item.quantity,
            "quantity updated"
        );

        Ok(QuantityUpdate::Updated(item.clone()))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the product has no line.
    pub fn remove(&mut self, id: &ProductId) -> Result<LineItem, LedgerError> {
        let idx = self
            .items
            .iter()
            .position(|item| &item.product == id)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        let removed = self.items.remove(idx);

        debug!(product = %id, "line removed");

        Ok(removed)
    }

    /// Calculate the subtotal: the exact sum of every line total.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::Pricing`] if a line total overflows.
    pub fn subtotal(&self) -> Result<Price, LedgerError> {
        let line_totals = self
            .items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(total_price(line_totals, self.currency)?)
    }

    /// Calculate tax on the subtotal at `rate` (0.08 for 8%). Not rounded.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::Pricing`] on overflow.
    pub fn tax(&self, rate: Percentage) -> Result<ExactAmount, LedgerError> {
        Ok(ExactAmount::from(self.subtotal()?).apply_rate(rate)?)
    }

    /// Calculate `subtotal + tax` at `rate`. Not rounded.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError::Pricing`] on overflow.
    pub fn total(&self, rate: Percentage) -> Result<ExactAmount, LedgerError> {
        let subtotal = ExactAmount::from(self.subtotal()?);

        Ok(subtotal.add(subtotal.apply_rate(rate)?)?)
    }

    /// Line total for one product.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the product has no line, or a
    /// [`LedgerError::Pricing`] on overflow.
    pub fn line_total(&self, id: &ProductId) -> Result<Price, LedgerError> {
        let item = self.get(id).ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        Ok(item.line_total()?)
    }

    /// Get the line for a product.
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.product == id)
    }

    /// Whether the product has a line.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Total number of units across every line.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Get the number of lines in the ledger.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the ledger.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Clamp a requested quantity into `1..=ceiling`. `ceiling` must be at least one.
fn clamp_quantity(requested: i64, ceiling: u32) -> u32 {
    u32::try_from(requested.clamp(1, i64::from(ceiling))).unwrap_or(ceiling)
}
