//! Products

use std::fmt;

use rusty_money::iso::Currency;
use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::{Price, parse_amount};

/// Stable, opaque product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    /// Product category
    pub category: String,

    /// Product price
    pub price: Price,

    /// Units on hand
    pub stock: u32,

    /// Optional free-text description
    pub description: Option<String>,
}

impl Product {
    /// The catalog record a cart ledger needs to add this product.
    pub fn descriptor(&self) -> ProductDescriptor {
        ProductDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            unit_price: self.price,
            stock_ceiling: self.stock,
        }
    }

    /// Stock status of this product under the given thresholds.
    pub fn stock_status(&self, thresholds: StockThresholds) -> StockStatus {
        StockStatus::for_stock(self.stock, thresholds)
    }
}

/// Catalog record consumed by the cart ledger.
///
/// Price and stock are captured at the moment the record is taken; later catalog changes are
/// not reflected.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDescriptor {
    /// Product id
    pub id: ProductId,

    /// Display label
    pub name: String,

    /// Unit price at insertion time
    pub unit_price: Price,

    /// Maximum quantity that can be sold
    pub stock_ceiling: u32,
}

/// Thresholds used to classify stock levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockThresholds {
    /// Products with fewer units than this (but more than zero) are low on stock.
    pub low_stock: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self { low_stock: 10 }
    }
}

/// Stock status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockStatus {
    /// No units on hand.
    OutOfStock,

    /// Some units, below the low-stock threshold.
    LowStock,

    /// At or above the low-stock threshold.
    InStock,
}

impl StockStatus {
    /// Classify a stock level.
    pub fn for_stock(stock: u32, thresholds: StockThresholds) -> Self {
        if stock == 0 {
            Self::OutOfStock
        } else if stock < thresholds.low_stock {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of Stock",
            Self::LowStock => "Low Stock",
            Self::InStock => "In Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw, unvalidated input from the add-product form.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    /// Product name
    pub name: String,

    /// Category
    pub category: String,

    /// Price in major units, e.g. "999.99"
    pub price: String,

    /// Stock quantity, e.g. "25"
    pub stock: String,

    /// Optional description
    pub description: String,

    /// Stock keeping unit
    pub sku: String,
}

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// Product name
    Name,
    /// Category
    Category,
    /// Price
    Price,
    /// Stock quantity
    Stock,
    /// Stock keeping unit
    Sku,
}

/// Every validation failure found in a [`ProductDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("product draft has {} invalid field(s)", .0.len())]
pub struct ProductValidationErrors(SmallVec<[(DraftField, &'static str); 5]>);

impl ProductValidationErrors {
    /// The message for a field, if it failed.
    pub fn get(&self, field: DraftField) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(failed, _)| *failed == field)
            .map(|(_, message)| *message)
    }

    /// Iterate over failed fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = &(DraftField, &'static str)> {
        self.0.iter()
    }

    /// Number of failed fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ProductDraft {
    /// Validate the draft and build a product with the given id.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once, not just the first.
    pub fn validate(
        &self,
        id: ProductId,
        currency: &'static Currency,
    ) -> Result<Product, ProductValidationErrors> {
        let mut errors = SmallVec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push((DraftField::Name, "Product name is required"));
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.push((DraftField::Category, "Category is required"));
        }

        let price = parse_amount(&self.price, currency)
            .ok()
            .filter(|price| price.to_minor_units() > 0);
        if price.is_none() {
            errors.push((DraftField::Price, "Valid price is required"));
        }

        let stock = self.stock.trim().parse::<u32>().ok();
        if stock.is_none() {
            errors.push((DraftField::Stock, "Valid stock quantity is required"));
        }

        let sku = self.sku.trim();
        if sku.is_empty() {
            errors.push((DraftField::Sku, "SKU is required"));
        }

        match (price, stock) {
            (Some(price), Some(stock)) if errors.is_empty() => {
                let description = self.description.trim();

                Ok(Product {
                    id,
                    name: name.to_string(),
                    sku: sku.to_string(),
                    category: category.to_string(),
                    price,
                    stock,
                    description: (!description.is_empty()).then(|| description.to_string()),
                })
            }
            _ => Err(ProductValidationErrors(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "iPhone 15 Pro".to_string(),
            category: "Electronics".to_string(),
            price: "999.99".to_string(),
            stock: "25".to_string(),
            description: "  ".to_string(),
            sku: "IP15P".to_string(),
        }
    }

    #[test]
    fn valid_draft_builds_product() -> TestResult {
        let product = draft().validate(ProductId::new("1"), INR)?;

        assert_eq!(product.name, "iPhone 15 Pro");
        assert_eq!(product.price, Money::from_minor(99_999, INR));
        assert_eq!(product.stock, 25);
        assert_eq!(product.description, None);

        Ok(())
    }

    #[test]
    fn invalid_draft_reports_every_field() {
        let draft = ProductDraft {
            name: " ".to_string(),
            category: String::new(),
            price: "0".to_string(),
            stock: "-1".to_string(),
            description: String::new(),
            sku: String::new(),
        };

        let Err(errors) = draft.validate(ProductId::new("1"), INR) else {
            unreachable!("an empty draft never validates");
        };

        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get(DraftField::Name), Some("Product name is required"));
        assert_eq!(errors.get(DraftField::Price), Some("Valid price is required"));
        assert_eq!(
            errors.get(DraftField::Stock),
            Some("Valid stock quantity is required")
        );
    }

    #[test]
    fn zero_stock_is_a_valid_draft() -> TestResult {
        let draft = ProductDraft {
            stock: "0".to_string(),
            ..draft()
        };

        let product = draft.validate(ProductId::new("3"), INR)?;

        assert_eq!(product.stock_status(StockThresholds::default()), StockStatus::OutOfStock);

        Ok(())
    }

    #[test]
    fn stock_status_thresholds() {
        let thresholds = StockThresholds::default();

        assert_eq!(StockStatus::for_stock(0, thresholds), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_stock(9, thresholds), StockStatus::LowStock);
        assert_eq!(StockStatus::for_stock(10, thresholds), StockStatus::InStock);
        assert_eq!(StockStatus::InStock.to_string(), "In Stock");
    }

    #[test]
    fn descriptor_captures_price_and_stock() -> TestResult {
        let product = draft().validate(ProductId::new("1"), INR)?;
        let descriptor = product.descriptor();

        assert_eq!(descriptor.id, ProductId::new("1"));
        assert_eq!(descriptor.unit_price, product.price);
        assert_eq!(descriptor.stock_ceiling, 25);

        Ok(())
    }
}
