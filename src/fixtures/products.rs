//! Product Fixtures

use serde::Deserialize;

use crate::{
    catalog::Catalog,
    fixtures::FixtureError,
    pricing::parse_price,
    products::{Product, ProductId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductsFixture {
    /// Products, in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFixture {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    /// Category
    pub category: String,

    /// Product price (e.g., "999.99 INR")
    pub price: String,

    /// Units on hand
    pub stock: u32,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_price(&fixture.price).map_err(|source| FixtureError::Price {
            product: fixture.id.clone(),
            source,
        })?;

        Ok(Product {
            id: ProductId::new(fixture.id),
            name: fixture.name,
            sku: fixture.sku,
            category: fixture.category,
            price,
            stock: fixture.stock,
            description: fixture.description,
        })
    }
}

/// Parse a YAML products document into a catalog.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, the fixture is empty, or a product is invalid.
pub fn parse_catalog(contents: &str) -> Result<Catalog, FixtureError> {
    let fixture: ProductsFixture = serde_norway::from_str(contents)?;

    let products = fixture
        .products
        .into_iter()
        .map(Product::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let currency = products
        .first()
        .map(|product| product.price.currency())
        .ok_or(FixtureError::NoProducts)?;

    Ok(Catalog::with_products(products, currency)?)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{catalog::CatalogError, pricing::PricingError};

    use super::*;

    #[test]
    fn parses_products_in_order() -> TestResult {
        let catalog = parse_catalog(
            "products:
  - { id: b, name: Bread, sku: B1, category: Bakery, price: 2.20 GBP, stock: 4 }
  - { id: a, name: Apple, sku: A1, category: Produce, price: 0.75 GBP, stock: 40 }
",
        )?;

        let names: Vec<_> = catalog.search("", None).iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, ["Bread", "Apple"]);
        assert_eq!(catalog.currency(), GBP);
        assert_eq!(
            catalog.search("apple", None).first().map(|p| p.price),
            Some(Money::from_minor(75, GBP))
        );

        Ok(())
    }

    #[test]
    fn rejects_mixed_currencies() {
        let result = parse_catalog(
            "products:
  - { id: a, name: Apple, sku: A1, category: Produce, price: 0.75 GBP, stock: 1 }
  - { id: b, name: Bread, sku: B1, category: Bakery, price: 2.20 USD, stock: 1 }
",
        );

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn rejects_bad_price() {
        let result = parse_catalog(
            "products:
  - { id: a, name: Apple, sku: A1, category: Produce, price: '0.75', stock: 1 }
",
        );

        assert!(matches!(
            result,
            Err(FixtureError::Price { source: PricingError::InvalidPrice(_), .. })
        ));
    }

    #[test]
    fn rejects_empty_fixture() {
        let result = parse_catalog("products: []\n");

        assert!(matches!(result, Err(FixtureError::NoProducts)));
    }
}
