//! Receipt

use std::io;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::Actor,
    ledger::{Ledger, LedgerError},
    pricing::{ExactAmount, Price, PricingError, format_price, percent_points},
    products::ProductId,
    session::Customer,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Rounding an amount for display failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Writing to the output failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One line of a completed sale.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product id
    pub product: ProductId,

    /// Display label
    pub name: String,

    /// Unit price
    pub unit_price: Price,

    /// Quantity sold
    pub quantity: u32,

    /// `unit_price * quantity`
    pub line_total: Price,
}

/// Snapshot of a completed sale.
///
/// Amounts are held exactly; rounding happens only in [`SaleReceipt::write_to`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    sale_id: Uuid,
    actor: Actor,
    customer: Customer,
    lines: Vec<ReceiptLine>,
    subtotal: Price,
    tax_rate: Percentage,
    tax: ExactAmount,
    total: ExactAmount,
    completed_at: Timestamp,
}

impl SaleReceipt {
    /// Snapshot a ledger into a receipt.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if a line total or the subtotal overflows.
    pub fn from_ledger(
        sale_id: Uuid,
        actor: Actor,
        customer: Customer,
        ledger: &Ledger,
        tax_rate: Percentage,
        completed_at: Timestamp,
    ) -> Result<Self, LedgerError> {
        let lines = ledger
            .items()
            .iter()
            .map(|item| {
                Ok(ReceiptLine {
                    product: item.product().clone(),
                    name: item.name().to_string(),
                    unit_price: *item.unit_price(),
                    quantity: item.quantity(),
                    line_total: item.line_total()?,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Self {
            sale_id,
            actor,
            customer,
            lines,
            subtotal: ledger.subtotal()?,
            tax_rate,
            tax: ledger.tax(tax_rate)?,
            total: ledger.total(tax_rate)?,
            completed_at,
        })
    }

    /// Sale id
    pub fn sale_id(&self) -> Uuid {
        self.sale_id
    }

    /// Operator who rang up the sale
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Customer details
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Lines in cart order
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Exact subtotal
    pub fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Tax rate applied
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Unrounded tax
    pub fn tax(&self) -> ExactAmount {
        self.tax
    }

    /// Unrounded total
    pub fn total(&self) -> ExactAmount {
        self.total
    }

    /// Completion time
    pub fn completed_at(&self) -> Timestamp {
        self.completed_at
    }

    /// Write the receipt to the given output as a table plus a summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if rounding fails or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        write_receipt_header(&mut out, self)?;
        write_receipt_table(&mut out, &self.lines)?;
        write_receipt_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_receipt_header(
    out: &mut impl io::Write,
    receipt: &SaleReceipt,
) -> Result<(), ReceiptError> {
    writeln!(out, "Sale {}", receipt.sale_id)?;
    writeln!(out, "Cashier: {}", receipt.actor.email)?;
    writeln!(out, "Completed: {}", receipt.completed_at)?;

    let customer = &receipt.customer;

    for (label, value) in [
        ("Customer", &customer.name),
        ("Email", &customer.email),
        ("Phone", &customer.phone),
    ] {
        if let Some(value) = value {
            writeln!(out, "{label}: {value}")?;
        }
    }

    Ok(())
}

fn write_receipt_table(
    out: &mut impl io::Write,
    lines: &[ReceiptLine],
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Unit Price", "Qty", "Line Total"]);

    for line in lines {
        builder.push_record([
            line.name.clone(),
            format_price(&line.unit_price),
            line.quantity.to_string(),
            format_price(&line.line_total),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Alignment::center());
    table.modify(Columns::new(1..4), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &SaleReceipt,
) -> Result<(), ReceiptError> {
    let rows = [
        ("Subtotal:".to_string(), format_price(&receipt.subtotal)),
        (
            format!("Tax ({}%):", percent_points(receipt.tax_rate)),
            format_price(&receipt.tax.round_for_display()?),
        ),
        (
            "Total:".to_string(),
            format_price(&receipt.total.round_for_display()?),
        ),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, " {label:<label_width$} {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}
