//! Sales journal
//!
//! Append-only, in-memory record of completed sales. Order numbers start at 1.

use jiff::{civil::Date, tz::TimeZone};
use tracing::info;

use crate::receipt::SaleReceipt;

/// A recorded sale.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    /// Sequential order number
    pub order_number: u64,

    /// The completed sale
    pub receipt: SaleReceipt,
}

/// Sales Journal
#[derive(Debug, Clone, Default)]
pub struct SalesJournal {
    entries: Vec<JournalEntry>,
}

impl SalesJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sale and return its order number.
    pub fn record(&mut self, receipt: SaleReceipt) -> u64 {
        let order_number = self
            .entries
            .last()
            .map_or(1, |entry| entry.order_number + 1);

        info!(order_number, sale = %receipt.sale_id(), "order recorded");

        self.entries.push(JournalEntry {
            order_number,
            receipt,
        });

        order_number
    }

    /// Look up an order by number.
    pub fn get(&self, order_number: u64) -> Option<&JournalEntry> {
        self.entries
            .iter()
            .find(|entry| entry.order_number == order_number)
    }

    /// Entries in recording order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries completed on `date` in time zone `tz`.
    pub fn for_day<'a>(
        &'a self,
        date: Date,
        tz: &'a TimeZone,
    ) -> impl Iterator<Item = &'a JournalEntry> + 'a {
        self.entries.iter().filter(move |entry| {
            entry.receipt.completed_at().to_zoned(tz.clone()).date() == date
        })
    }

    /// Number of recorded orders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
