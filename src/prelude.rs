//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    auth::{Actor, AuthError, AuthProvider, Credentials, InMemoryAuthProvider, Session},
    catalog::{Catalog, CatalogError, CatalogProvider, CatalogStats},
    config::{ConfigError, TillConfig},
    dashboard::{DashboardError, DashboardMetrics},
    fixtures::{Fixture, FixtureError},
    journal::{JournalEntry, SalesJournal},
    ledger::{AddOutcome, Ledger, LedgerError, LineItem, QuantityUpdate},
    pricing::{ExactAmount, Price, PricingError, format_price, parse_price, parse_rate},
    products::{
        Product, ProductDescriptor, ProductDraft, ProductId, ProductValidationErrors,
        StockStatus, StockThresholds,
    },
    receipt::{ReceiptError, ReceiptLine, SaleReceipt},
    session::{Customer, SaleSession, SessionError},
};
