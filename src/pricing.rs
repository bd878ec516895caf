//! Pricing
//!
//! Monetary values are held in integer minor units as [`Money`]. Anything derived from a
//! rate (tax, grand totals) may carry sub-minor precision and is kept as an [`ExactAmount`]
//! until the presentation boundary rounds it with [`ExactAmount::round_for_display`].

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

/// Number of minor-unit digits shared by every supported currency.
pub const MINOR_UNIT_DIGITS: u32 = 2;

/// A price held in minor units.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while pricing lines and totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Multiplying a unit price by a quantity left the `i64` range.
    #[error("line total overflowed: {quantity} x {unit_minor} minor units")]
    Overflow {
        /// Unit price in minor units
        unit_minor: i64,
        /// Requested quantity
        quantity: u32,
    },

    /// An exact amount could not be represented, either during arithmetic or as minor units.
    #[error("amount {0} cannot be represented")]
    NotRepresentable(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Price string was malformed, negative or finer than a minor unit.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Tax rate string was malformed or negative.
    #[error("Invalid tax rate: {0}")]
    InvalidRate(String),

    /// Currency code is not one the till trades in.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Calculates `unit_price * quantity` exactly in minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total(unit_price: &Price, quantity: u32) -> Result<Price, PricingError> {
    let unit_minor = unit_price.to_minor_units();

    let minor = unit_minor
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow {
            unit_minor,
            quantity,
        })?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sums a sequence of prices, starting from zero in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if any price is in a different currency.
pub fn total_price(
    prices: impl IntoIterator<Item = Price>,
    currency: &'static Currency,
) -> Result<Price, PricingError> {
    let total = prices
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, price| acc.add(price))?;

    Ok(total)
}

/// An unrounded monetary amount in major units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExactAmount {
    amount: Decimal,
    currency: &'static Currency,
}

impl ExactAmount {
    /// Creates an amount from a major-unit decimal.
    pub fn new(amount: Decimal, currency: &'static Currency) -> Self {
        Self { amount, currency }
    }

    /// A zero amount in `currency`.
    pub fn zero(currency: &'static Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// The amount in major units.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency of the amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Adds two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Money`] on currency mismatch and
    /// [`PricingError::NotRepresentable`] on decimal overflow.
    pub fn add(self, other: ExactAmount) -> Result<ExactAmount, PricingError> {
        ensure_same_currency(self.currency, other.currency)?;

        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(PricingError::NotRepresentable(self.amount))?;

        Ok(Self::new(amount, self.currency))
    }

    /// Multiplies the amount by a fractional rate (0.08 for 8%). No rounding is applied.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NotRepresentable`] on decimal overflow.
    pub fn apply_rate(self, rate: Percentage) -> Result<ExactAmount, PricingError> {
        let amount = self
            .amount
            .checked_mul(rate_fraction(rate))
            .ok_or(PricingError::NotRepresentable(self.amount))?;

        Ok(Self::new(amount, self.currency))
    }

    /// Rounds half away from zero to whole minor units for display.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NotRepresentable`] if the amount does not fit in `i64` minor units.
    pub fn round_for_display(&self) -> Result<Price, PricingError> {
        let minor = self
            .amount
            .round_dp_with_strategy(MINOR_UNIT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|value| value.to_i64())
            .ok_or(PricingError::NotRepresentable(self.amount))?;

        Ok(Money::from_minor(minor, self.currency))
    }
}

impl From<Price> for ExactAmount {
    fn from(price: Price) -> Self {
        Self::new(
            Decimal::new(price.to_minor_units(), MINOR_UNIT_DIGITS),
            price.currency(),
        )
    }
}

impl fmt::Display for ExactAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency.iso_alpha_code)
    }
}

fn ensure_same_currency(
    expected: &'static Currency,
    actual: &'static Currency,
) -> Result<(), MoneyError> {
    if expected == actual {
        Ok(())
    } else {
        Err(MoneyError::CurrencyMismatch {
            expected: expected.iso_alpha_code,
            actual: actual.iso_alpha_code,
        })
    }
}

/// Unwraps a rate into its fraction (0.08 for 8%).
pub fn rate_fraction(rate: Percentage) -> Decimal {
    // `Percentage` does not expose its inner decimal, so multiply it out.
    rate * Decimal::ONE
}

/// Converts a fractional rate to percent points for display (0.08 -> 8).
pub fn percent_points(rate: Percentage) -> Decimal {
    (rate_fraction(rate) * Decimal::ONE_HUNDRED).normalize()
}

/// Resolve an ISO currency code to one of the supported currencies.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] for anything other than GBP, USD, EUR or INR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, PricingError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        "INR" => Ok(iso::INR),
        _ => Err(PricingError::UnknownCurrency(code.to_string())),
    }
}

/// Parse a major-unit amount (e.g. "999.99") into a price.
///
/// # Errors
///
/// Returns [`PricingError::InvalidPrice`] if the amount is malformed, negative, or has more
/// precision than a minor unit.
pub fn parse_amount(s: &str, currency: &'static Currency) -> Result<Price, PricingError> {
    let invalid = || PricingError::InvalidPrice(s.to_string());

    let amount = s.trim().parse::<Decimal>().map_err(|_err| invalid())?;

    if amount.is_sign_negative() {
        return Err(invalid());
    }

    let minor = amount.checked_mul(Decimal::ONE_HUNDRED).ok_or_else(invalid)?;

    if !minor.fract().is_zero() {
        return Err(invalid());
    }

    let minor = minor.to_i64().ok_or_else(invalid)?;

    Ok(Money::from_minor(minor, currency))
}

/// Parse a price string (e.g. "999.99 INR") into a price.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is
/// invalid, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Price, PricingError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PricingError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(code)?;

    parse_amount(amount, currency).map_err(|_err| PricingError::InvalidPrice(s.to_string()))
}

/// Parse a tax rate given either as percent points ("8%") or as a fraction ("0.08").
///
/// A bare number must be a fraction no greater than one; "8" is rejected rather than
/// read as 800%.
///
/// # Errors
///
/// Returns [`PricingError::InvalidRate`] if the rate is malformed, negative, or an
/// unsuffixed value above one.
pub fn parse_rate(s: &str) -> Result<Percentage, PricingError> {
    let invalid = || PricingError::InvalidRate(s.to_string());
    let trimmed = s.trim();

    let fraction = if let Some(points) = trimmed.strip_suffix('%') {
        points
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?
    } else {
        let fraction = trimmed.parse::<Decimal>().map_err(|_err| invalid())?;

        if fraction > Decimal::ONE {
            return Err(invalid());
        }

        fraction
    };

    if fraction.is_sign_negative() && !fraction.is_zero() {
        return Err(invalid());
    }

    Ok(Percentage::from(fraction))
}

/// Format a price for display with its currency symbol, e.g. `₹1619.97`.
pub fn format_price(price: &Price) -> String {
    let minor_units = price.to_minor_units();
    let abs_minor = minor_units.unsigned_abs();
    let major_units = abs_minor / 100;
    let fractional = abs_minor % 100;
    let sign = if minor_units < 0 { "-" } else { "" };
    let currency_code = price.currency().iso_alpha_code;

    let symbol = match currency_code {
        "GBP" => "£",
        "USD" => "$",
        "EUR" => "€",
        "INR" => "₹",
        _ => "",
    };

    if symbol.is_empty() {
        format!("{sign}{major_units}.{fractional:02} {currency_code}")
    } else {
        format!("{sign}{symbol}{major_units}.{fractional:02}")
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, INR, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn line_total_multiplies_minor_units() -> TestResult {
        let total = line_total(&Money::from_minor(24_999, INR), 2)?;

        assert_eq!(total, Money::from_minor(49_998, INR));

        Ok(())
    }

    #[test]
    fn line_total_reports_overflow() {
        let result = line_total(&Money::from_minor(i64::MAX, INR), 2);

        assert!(matches!(
            result,
            Err(PricingError::Overflow { quantity: 2, .. })
        ));
    }

    #[test]
    fn total_price_of_nothing_is_zero() -> TestResult {
        assert_eq!(total_price([], GBP)?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn total_price_rejects_mixed_currencies() {
        let result = total_price(
            [Money::from_minor(100, GBP), Money::from_minor(100, USD)],
            GBP,
        );

        assert_eq!(
            result,
            Err(PricingError::Money(MoneyError::CurrencyMismatch {
                expected: GBP.iso_alpha_code,
                actual: USD.iso_alpha_code,
            }))
        );
    }

    #[test]
    fn apply_rate_keeps_sub_minor_precision() -> TestResult {
        let subtotal = ExactAmount::from(Money::from_minor(149_997, INR));
        let tax = subtotal.apply_rate(Percentage::from(Decimal::new(8, 2)))?;

        assert_eq!(tax.amount(), Decimal::new(1_199_976, 4));
        assert_eq!(subtotal.add(tax)?.amount(), Decimal::new(16_199_676, 4));

        Ok(())
    }

    #[test]
    fn round_for_display_rounds_half_away_from_zero() -> TestResult {
        let up = ExactAmount::new(Decimal::new(10_005, 3), GBP);
        let down = ExactAmount::new(Decimal::new(16_199_676, 4), INR);

        assert_eq!(up.round_for_display()?, Money::from_minor(1_001, GBP));
        assert_eq!(down.round_for_display()?, Money::from_minor(161_997, INR));

        Ok(())
    }

    #[test]
    fn exact_add_rejects_mixed_currencies() {
        let result = ExactAmount::zero(GBP).add(ExactAmount::zero(USD));

        assert!(matches!(result, Err(PricingError::Money(_))));
    }

    #[test]
    fn parse_price_accepts_amount_and_code() -> TestResult {
        assert_eq!(parse_price("999.99 INR")?, Money::from_minor(99_999, INR));
        assert_eq!(parse_price("2 usd")?, Money::from_minor(200, USD));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("2.99GBP"),
            Err(PricingError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("2.999 GBP"),
            Err(PricingError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("-1 GBP"),
            Err(PricingError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(PricingError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_rate_accepts_points_and_fractions() -> TestResult {
        let eight = Decimal::new(8, 2);

        assert_eq!(rate_fraction(parse_rate("8%")?), eight);
        assert_eq!(rate_fraction(parse_rate("0.08")?), eight);
        assert_eq!(percent_points(parse_rate(" 12.5 % ")?), Decimal::new(125, 1));

        Ok(())
    }

    #[test]
    fn parse_rate_rejects_negative_and_garbage() {
        assert!(matches!(parse_rate("-5%"), Err(PricingError::InvalidRate(_))));
        assert!(matches!(parse_rate("eight"), Err(PricingError::InvalidRate(_))));
    }

    #[test]
    fn parse_rate_rejects_bare_points() -> TestResult {
        assert!(matches!(parse_rate("8"), Err(PricingError::InvalidRate(_))));
        assert!(matches!(parse_rate("1.5"), Err(PricingError::InvalidRate(_))));
        assert_eq!(rate_fraction(parse_rate("1")?), Decimal::ONE);
        assert_eq!(percent_points(parse_rate("150%")?), Decimal::new(150, 0));

        Ok(())
    }

    #[test]
    fn format_price_uses_symbol() {
        assert_eq!(format_price(&Money::from_minor(161_997, INR)), "₹1619.97");
        assert_eq!(format_price(&Money::from_minor(-5, GBP)), "-£0.05");
    }
}
