//! Command line interface

use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use decimal_percentage::Percentage;
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthError, AuthProvider, Credentials, InMemoryAuthProvider},
    catalog::Catalog,
    config::{ConfigError, TillConfig},
    dashboard::{DashboardError, DashboardMetrics},
    fixtures::FixtureError,
    journal::SalesJournal,
    ledger::AddOutcome,
    logging::LoggingConfig,
    pricing::{format_price, parse_rate},
    products::{ProductId, StockThresholds},
    receipt::ReceiptError,
    session::{Customer, SaleSession, SessionError},
};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog fixture could not be loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Operator sign-in failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Sale could not be rung up.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Receipt could not be written.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Dashboard could not be computed.
    #[error(transparent)]
    Dashboard(#[from] DashboardError),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Point-of-sale till
#[derive(Debug, Parser)]
#[command(name = "till", about = "Point-of-sale till", long_about = None)]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "TILL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Till commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List catalog products with their stock status
    Products {
        /// Match product name or category
        #[arg(short, long, default_value = "")]
        search: String,

        /// Restrict to one category ("all" for every category)
        #[arg(long, default_value = "all")]
        category: String,
    },

    /// Ring up a sale and print its receipt
    Sale {
        /// Product to add, as ID or ID:QUANTITY (repeatable)
        #[arg(
            short,
            long = "add",
            value_name = "ID[:QTY]",
            value_parser = parse_line_request,
            required = true
        )]
        add: Vec<LineRequest>,

        /// Customer name
        #[arg(long)]
        customer_name: Option<String>,

        /// Customer email
        #[arg(long)]
        customer_email: Option<String>,

        /// Customer phone
        #[arg(long)]
        customer_phone: Option<String>,

        /// Override the configured tax rate ("8%" or the fraction "0.08"; a bare "8" is rejected)
        #[arg(long, value_parser = parse_rate)]
        tax_rate: Option<Percentage>,

        /// Operator email
        #[arg(long, env = "TILL_OPERATOR_EMAIL", default_value = "cashier@till.local")]
        operator_email: String,

        /// Operator password
        #[arg(
            long,
            env = "TILL_OPERATOR_PASSWORD",
            hide_env_values = true,
            default_value = "till-operator"
        )]
        operator_password: String,
    },

    /// Show today's sales and stock figures
    ///
    /// Sales are not persisted between runs, so the sales figures only cover sales rung up
    /// by this process and read zero for a fresh invocation.
    Dashboard,
}

/// A requested cart line from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRequest {
    /// Product id
    pub id: ProductId,

    /// Requested quantity, clamped by the cart
    pub quantity: i64,
}

fn parse_line_request(s: &str) -> Result<LineRequest, String> {
    let (id, quantity) = match s.split_once(':') {
        Some((id, quantity)) => (
            id,
            quantity
                .trim()
                .parse::<i64>()
                .map_err(|err| format!("invalid quantity in {s:?}: {err}"))?,
        ),
        None => (s, 1),
    };

    let id = id.trim();

    if id.is_empty() {
        return Err(format!("missing product id in {s:?}"));
    }

    Ok(LineRequest {
        id: ProductId::new(id),
        quantity,
    })
}

/// Run a parsed command, writing its output to `out`.
///
/// # Errors
///
/// Returns a [`CliError`] if configuration, the catalog or the command itself fails.
pub fn run(cli: Cli, out: &mut impl io::Write) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => TillConfig::load(path)?,
        None => TillConfig::default(),
    };

    let catalog = config.fixture().catalog(&config.catalog)?;

    info!(catalog = %config.catalog, products = catalog.len(), "catalog loaded");

    match cli.command {
        Command::Products { search, category } => {
            write_products(out, &catalog, &search, &category, config.thresholds())
        }
        Command::Sale {
            add,
            customer_name,
            customer_email,
            customer_phone,
            tax_rate,
            operator_email,
            operator_password,
        } => {
            let customer = Customer::from_form(
                customer_name.as_deref().unwrap_or_default(),
                customer_email.as_deref().unwrap_or_default(),
                customer_phone.as_deref().unwrap_or_default(),
            );
            let credentials = Credentials::new(operator_email, operator_password);
            let tax_rate = tax_rate.map_or_else(|| config.tax_rate(), Ok)?;

            ring_up_sale(out, &catalog, &add, customer, &credentials, tax_rate)
        }
        Command::Dashboard => write_dashboard(out, &catalog, &SalesJournal::new(), &config),
    }
}

fn write_products(
    out: &mut impl io::Write,
    catalog: &Catalog,
    search: &str,
    category: &str,
    thresholds: StockThresholds,
) -> Result<(), CliError> {
    let category = (!category.eq_ignore_ascii_case("all")).then_some(category);
    let products = catalog.search(search, category);

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "SKU", "Category", "Price", "Stock", "Status"]);

    for product in &products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.sku.clone(),
            product.category.clone(),
            format_price(&product.price),
            product.stock.to_string(),
            product.stock_status(thresholds).to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(4..6), Alignment::right());

    let stats = catalog.stats(thresholds);

    writeln!(out, "{table}")?;
    writeln!(
        out,
        "{} shown. {} products: {} in stock, {} low stock, {} out of stock",
        products.len(),
        stats.total,
        stats.in_stock,
        stats.low_stock,
        stats.out_of_stock
    )?;

    Ok(())
}

fn ring_up_sale(
    out: &mut impl io::Write,
    catalog: &Catalog,
    lines: &[LineRequest],
    customer: Customer,
    credentials: &Credentials,
    tax_rate: Percentage,
) -> Result<(), CliError> {
    let mut auth = InMemoryAuthProvider::new();
    auth.signup(credentials)?;
    auth.login(credentials)?;

    let mut session = SaleSession::from_auth(&auth, catalog.currency(), tax_rate)?;
    session.set_customer(customer);

    for line in lines {
        if line.quantity < 1 {
            writeln!(out, "Skipped {}: quantity {}", line.id, line.quantity)?;
            continue;
        }

        let outcome = session.add_product_with_quantity(catalog, &line.id, line.quantity)?;

        if let AddOutcome::AlreadyPresent { quantity } = outcome {
            writeln!(
                out,
                "Skipped {}: already in the cart with quantity {quantity}",
                line.id
            )?;
        }
    }

    let receipt = session.complete()?;
    let mut journal = SalesJournal::new();
    let order_number = journal.record(receipt.clone());

    writeln!(out, "Order #{order_number}")?;
    receipt.write_to(&mut *out)?;

    auth.logout()?;

    Ok(())
}

fn write_dashboard(
    out: &mut impl io::Write,
    catalog: &Catalog,
    journal: &SalesJournal,
    config: &TillConfig,
) -> Result<(), CliError> {
    let tz = config.time_zone()?;
    let today = Timestamp::now().to_zoned(tz.clone()).date();

    let metrics = DashboardMetrics::compute(
        catalog,
        journal,
        today,
        &tz,
        config.thresholds(),
        catalog.currency(),
    )?;

    let change = metrics.sales_change.map_or_else(
        || "n/a".to_string(),
        |change| {
            let sign = if change.is_sign_negative() { "" } else { "+" };

            format!("{sign}{change}%")
        },
    );

    writeln!(out, "Dashboard for {today}")?;
    writeln!(
        out,
        "  Today's sales:   {} ({change} vs yesterday)",
        format_price(&metrics.sales_today)
    )?;
    writeln!(out, "  Orders today:    {}", metrics.orders_today)?;
    writeln!(out, "  Total products:  {}", metrics.total_products())?;
    writeln!(out, "  Low stock items: {}", metrics.low_stock_items())?;
    writeln!(out, "  Out of stock:    {}", metrics.out_of_stock_items())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{io::Write, path::Path};

    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    fn config_file() -> TestResult<tempfile::NamedTempFile> {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let mut file = tempfile::NamedTempFile::new()?;

        writeln!(file, "fixtures_path: {}\ntimezone: UTC", fixtures.display())?;

        Ok(file)
    }

    fn run_args(args: &[&str]) -> TestResult<String> {
        let config = config_file()?;
        let config_path = config.path().display().to_string();

        let mut argv = vec!["till", "--config", config_path.as_str()];
        argv.extend_from_slice(args);

        let mut out = Vec::new();
        run(Cli::try_parse_from(argv)?, &mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_line_requests() -> TestResult {
        assert_eq!(
            parse_line_request("3:2")?,
            LineRequest {
                id: ProductId::new("3"),
                quantity: 2,
            }
        );
        assert_eq!(parse_line_request("1")?.quantity, 1);
        assert!(parse_line_request(":2").is_err());
        assert!(parse_line_request("1:x").is_err());

        Ok(())
    }

    #[test]
    fn sale_requires_at_least_one_line() {
        assert!(Cli::try_parse_from(["till", "sale"]).is_err());
    }

    #[test]
    fn products_lists_matching_products() -> TestResult {
        let output = run_args(&["products", "--search", "pro"])?;

        assert!(output.contains("iPhone 15 Pro"));
        assert!(output.contains("₹999.99"));
        assert!(!output.contains("USB-C Charger"));
        assert!(output.contains("7 products"));

        Ok(())
    }

    #[test]
    fn sale_prints_receipt_with_rounded_total() -> TestResult {
        let output = run_args(&[
            "sale",
            "--add",
            "1",
            "--add",
            "3:2",
            "--customer-name",
            "Asha",
        ])?;

        assert!(output.contains("Order #1"));
        assert!(output.contains("AirPods Pro"));
        assert!(output.contains("₹1619.97"));
        assert!(output.contains("Customer: Asha"));

        Ok(())
    }

    #[test]
    fn repeated_add_keeps_first_quantity() -> TestResult {
        let output = run_args(&["sale", "--add", "3:5", "--add", "3:2"])?;

        assert!(output.contains("Skipped 3: already in the cart with quantity 5"));
        assert!(output.contains("₹1249.95"));
        assert!(!output.contains("₹499.98"));

        Ok(())
    }

    #[test]
    fn non_positive_quantity_is_skipped() -> TestResult {
        let output = run_args(&["sale", "--add", "1", "--add", "3:0"])?;

        assert!(output.contains("Skipped 3: quantity 0"));
        assert!(!output.contains("AirPods Pro"));

        Ok(())
    }

    #[test]
    fn bare_tax_rate_above_one_is_rejected() {
        let result = Cli::try_parse_from(["till", "sale", "--add", "1", "--tax-rate", "8"]);

        assert!(result.is_err());
    }

    #[test]
    fn sale_of_out_of_stock_product_fails() -> TestResult {
        let config = config_file()?;
        let config_path = config.path().display().to_string();
        let cli = Cli::try_parse_from(["till", "--config", &config_path, "sale", "--add", "7"])?;

        let result = run(cli, &mut Vec::new());

        assert!(matches!(result, Err(CliError::Session(_))));

        Ok(())
    }

    #[test]
    fn dashboard_reports_stock_figures() -> TestResult {
        let output = run_args(&["dashboard"])?;

        assert!(output.contains("Total products:  7"));
        assert!(output.contains("Out of stock:    1"));
        assert!(output.contains("n/a vs yesterday"));

        Ok(())
    }
}
