//! Catalog
//!
//! The catalog supplies product records to sale sessions. The ledger never queries it again
//! after an add, so stock changing mid-session is not observed there.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::products::{
    Product, ProductDraft, ProductId, ProductValidationErrors, StockStatus, StockThresholds,
};

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A product with this id already exists.
    #[error("product {0} already exists")]
    DuplicateId(ProductId),

    /// A product with this SKU already exists.
    #[error("SKU {0} already exists")]
    DuplicateSku(String),

    /// Product currency differs from the catalog currency.
    #[error("Product {product} has currency {actual}, but catalog has currency {expected}")]
    CurrencyMismatch {
        /// Offending product
        product: ProductId,
        /// Catalog currency code
        expected: &'static str,
        /// Product currency code
        actual: &'static str,
    },

    /// The add-product form failed validation.
    #[error(transparent)]
    Invalid(#[from] ProductValidationErrors),
}

/// Source of product records for sale sessions.
pub trait CatalogProvider {
    /// Look up a product by id.
    fn get(&self, id: &ProductId) -> Option<&Product>;

    /// All products, in catalog order.
    fn products(&self) -> &[Product];
}

/// In-memory, insertion-ordered catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: FxHashMap<ProductId, usize>,
    currency: &'static Currency,
}

impl Catalog {
    /// Create an empty catalog trading in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: Vec::new(),
            by_id: FxHashMap::default(),
            currency,
        }
    }

    /// Create a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on duplicate ids, duplicate SKUs or currency mismatches.
    pub fn with_products(
        products: impl IntoIterator<Item = Product>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        products
            .into_iter()
            .try_for_each(|product| catalog.insert(product))?;

        Ok(catalog)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on duplicate ids, duplicate SKUs or currency mismatches.
    pub fn insert(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.by_id.contains_key(&product.id) {
            return Err(CatalogError::DuplicateId(product.id));
        }

        if self.products.iter().any(|existing| existing.sku == product.sku) {
            return Err(CatalogError::DuplicateSku(product.sku));
        }

        let product_currency = product.price.currency();
        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch {
                product: product.id,
                expected: self.currency.iso_alpha_code,
                actual: product_currency.iso_alpha_code,
            });
        }

        debug!(product = %product.id, sku = %product.sku, "catalog insert");

        self.by_id.insert(product.id.clone(), self.products.len());
        self.products.push(product);

        Ok(())
    }

    /// Validate an add-product form and insert the result under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] with every failing field, or an insert error.
    pub fn add_from_draft(&mut self, draft: &ProductDraft) -> Result<ProductId, CatalogError> {
        let product = draft.validate(self.next_id(), self.currency)?;
        let id = product.id.clone();

        self.insert(product)?;

        Ok(id)
    }

    /// Search products by name or category (case-insensitive), optionally restricted to
    /// one exact category.
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&Product> {
        let query = query.trim().to_lowercase();

        self.products
            .iter()
            .filter(|product| {
                query.is_empty()
                    || product.name.to_lowercase().contains(&query)
                    || product.category.to_lowercase().contains(&query)
            })
            .filter(|product| category.is_none_or(|category| product.category == category))
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();

        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }

        categories
    }

    /// Stock statistics over the whole catalog.
    pub fn stats(&self, thresholds: StockThresholds) -> CatalogStats {
        CatalogStats::from_products(&self.products, thresholds)
    }

    /// Catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn next_id(&self) -> ProductId {
        let mut candidate = self.products.len() + 1;

        loop {
            let id = ProductId::new(candidate.to_string());

            if !self.by_id.contains_key(&id) {
                return id;
            }

            candidate += 1;
        }
    }
}

impl CatalogProvider for Catalog {
    fn get(&self, id: &ProductId) -> Option<&Product> {
        self.by_id
            .get(id)
            .and_then(|&idx| self.products.get(idx))
    }

    fn products(&self) -> &[Product] {
        &self.products
    }
}

/// Stock counts over a set of products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Number of products
    pub total: usize,

    /// Products at or above the low-stock threshold
    pub in_stock: usize,

    /// Products below the low-stock threshold with some units left
    pub low_stock: usize,

    /// Products with no units
    pub out_of_stock: usize,
}

impl CatalogStats {
    /// Count stock statuses over `products`.
    pub fn from_products(products: &[Product], thresholds: StockThresholds) -> Self {
        products
            .iter()
            .fold(Self::default(), |mut stats, product| {
                stats.total += 1;

                match product.stock_status(thresholds) {
                    StockStatus::InStock => stats.in_stock += 1,
                    StockStatus::LowStock => stats.low_stock += 1,
                    StockStatus::OutOfStock => stats.out_of_stock += 1,
                }

                stats
            })
    }
}
