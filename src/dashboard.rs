//! Dashboard metrics

use jiff::{civil::Date, tz::TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{CatalogProvider, CatalogStats},
    journal::SalesJournal,
    pricing::{Price, PricingError, total_price},
    products::StockThresholds,
};

/// Errors raised while computing dashboard metrics.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Summing sales failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The previous day could not be computed.
    #[error("invalid date: {0}")]
    Date(#[from] jiff::Error),
}

/// Figures shown on the dashboard for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    /// Sum of display-rounded totals completed on the day
    pub sales_today: Price,

    /// Percentage change against the previous day, to one decimal place. `None` when the
    /// previous day had no sales.
    pub sales_change: Option<Decimal>,

    /// Number of orders completed on the day
    pub orders_today: usize,

    /// Stock counts across the catalog
    pub stock: CatalogStats,
}

impl DashboardMetrics {
    /// Compute the metrics for `date` in time zone `tz`.
    ///
    /// # Errors
    ///
    /// Returns a [`DashboardError`] if a recorded sale is in another currency, a sum
    /// overflows, or `date` has no previous day.
    pub fn compute<C: CatalogProvider>(
        catalog: &C,
        journal: &SalesJournal,
        date: Date,
        tz: &TimeZone,
        thresholds: StockThresholds,
        currency: &'static Currency,
    ) -> Result<Self, DashboardError> {
        let (sales_today, orders_today) = day_sales(journal, date, tz, currency)?;
        let (sales_yesterday, _) = day_sales(journal, date.yesterday()?, tz, currency)?;

        Ok(Self {
            sales_today,
            sales_change: percent_change(&sales_yesterday, &sales_today),
            orders_today,
            stock: CatalogStats::from_products(catalog.products(), thresholds),
        })
    }

    /// Total number of products in the catalog.
    pub fn total_products(&self) -> usize {
        self.stock.total
    }

    /// Products that are low on stock.
    pub fn low_stock_items(&self) -> usize {
        self.stock.low_stock
    }

    /// Products with no stock.
    pub fn out_of_stock_items(&self) -> usize {
        self.stock.out_of_stock
    }
}

fn day_sales(
    journal: &SalesJournal,
    date: Date,
    tz: &TimeZone,
    currency: &'static Currency,
) -> Result<(Price, usize), PricingError> {
    let totals = journal
        .for_day(date, tz)
        .map(|entry| entry.receipt.total().round_for_display())
        .collect::<Result<Vec<_>, _>>()?;
    let orders = totals.len();

    Ok((total_price(totals, currency)?, orders))
}

fn percent_change(before: &Price, after: &Price) -> Option<Decimal> {
    let before = Decimal::from(before.to_minor_units());
    let after = Decimal::from(after.to_minor_units());

    if before.is_zero() {
        return None;
    }

    after
        .checked_sub(before)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(before)
        .map(|change| change.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}
