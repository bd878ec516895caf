//! Fixtures
//!
//! Catalog fixtures live in `<base>/products/<name>.yml`.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    pricing::PricingError,
};

pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price in a product fixture
    #[error("Invalid price for product {product}: {source}")]
    Price {
        /// Fixture product id
        product: String,
        /// Underlying pricing error
        #[source]
        source: PricingError,
    },

    /// The fixture has no products, so the catalog currency is unknown
    #[error("No products in fixture; currency unknown")]
    NoProducts,

    /// Catalog construction error (duplicates, currency mismatch)
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a catalog from a YAML product fixture.
    ///
    /// The catalog currency is taken from the first product.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a product is invalid.
    pub fn catalog(&self, name: &str) -> Result<Catalog, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        products::parse_catalog(&contents)
    }
}
