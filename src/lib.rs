//! Till
//!
//! Till is a point-of-sale engine: a product catalog, a per-sale cart ledger with exact money
//! arithmetic, sale sessions tied to a signed-in operator, receipts, a sales journal and
//! dashboard metrics.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod fixtures;
pub mod journal;
pub mod ledger;
pub mod logging;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
