//! Sale session
//!
//! A sale session is the context one operator works in while ringing up a sale: a cart
//! ledger, the signed-in actor, optional customer details and the tax rate in force.
//! Sessions are independent values; two open sessions never share a ledger.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{Actor, AuthProvider},
    catalog::CatalogProvider,
    ledger::{AddOutcome, Ledger, LedgerError, QuantityUpdate},
    pricing::{ExactAmount, Price},
    products::{Product, ProductId},
    receipt::SaleReceipt,
};

/// Errors raised by a sale session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nobody is signed in to the identity provider.
    #[error("no operator is signed in")]
    NotAuthenticated,

    /// The catalog has no product with this id.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    /// The sale has no lines. The session is handed back unchanged.
    #[error("cannot complete a sale with an empty cart")]
    EmptyCart(Box<SaleSession>),

    /// Ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Optional customer details attached to a sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    /// Customer name
    pub name: Option<String>,

    /// Customer email
    pub email: Option<String>,

    /// Customer phone number
    pub phone: Option<String>,
}

impl Customer {
    /// Build customer details from free-text form fields. Blank fields become `None`.
    pub fn from_form(name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: non_blank(name),
            email: non_blank(email),
            phone: non_blank(phone),
        }
    }

    /// Whether no detail was given.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Sale Session
#[derive(Debug, Clone)]
pub struct SaleSession {
    id: Uuid,
    actor: Actor,
    ledger: Ledger,
    tax_rate: Percentage,
    customer: Customer,
    opened_at: Timestamp,
}

impl SaleSession {
    /// Open a session for `actor` with an empty ledger.
    pub fn new(actor: Actor, currency: &'static Currency, tax_rate: Percentage) -> Self {
        let session = Self {
            id: Uuid::now_v7(),
            actor,
            ledger: Ledger::new(currency),
            tax_rate,
            customer: Customer::default(),
            opened_at: Timestamp::now(),
        };

        info!(sale = %session.id, user = %session.actor.user_id, "sale session opened");

        session
    }

    /// Open a session for whoever is signed in to `auth`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] if there is no current session.
    pub fn from_auth<A: AuthProvider + ?Sized>(
        auth: &A,
        currency: &'static Currency,
        tax_rate: Percentage,
    ) -> Result<Self, SessionError> {
        let session = auth
            .current_session()
            .ok_or(SessionError::NotAuthenticated)?;

        Ok(Self::new(session.actor, currency, tax_rate))
    }

    /// Products whose name matches `query` and that are not yet in the cart.
    ///
    /// An empty query matches nothing.
    pub fn available_products<'c, C: CatalogProvider>(
        &self,
        catalog: &'c C,
        query: &str,
    ) -> Vec<&'c Product> {
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            return Vec::new();
        }

        catalog
            .products()
            .iter()
            .filter(|product| product.name.to_lowercase().contains(&query))
            .filter(|product| !self.ledger.contains(&product.id))
            .collect()
    }

    /// Add one unit of a catalog product.
    ///
    /// # Errors
    ///
    /// See [`SaleSession::add_product_with_quantity`].
    pub fn add_product<C: CatalogProvider>(
        &mut self,
        catalog: &C,
        id: &ProductId,
    ) -> Result<AddOutcome, SessionError> {
        self.add_product_with_quantity(catalog, id, 1)
    }

    /// Add a catalog product with a requested quantity, clamped into its stock range.
    /// A product already in the cart is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownProduct`] if the catalog lacks the id, or a ledger
    /// error (out of stock, currency mismatch).
    pub fn add_product_with_quantity<C: CatalogProvider>(
        &mut self,
        catalog: &C,
        id: &ProductId,
        quantity: i64,
    ) -> Result<AddOutcome, SessionError> {
        let product = catalog
            .get(id)
            .ok_or_else(|| SessionError::UnknownProduct(id.clone()))?;

        Ok(self.ledger.add_with_quantity(&product.descriptor(), quantity)?)
    }

    /// Raise a line's quantity by one, saturating at its stock ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the product is not in the cart.
    pub fn increment(&mut self, id: &ProductId) -> Result<QuantityUpdate, SessionError> {
        self.step_quantity(id, 1)
    }

    /// Lower a line's quantity by one. A line at quantity one is removed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the product is not in the cart.
    pub fn decrement(&mut self, id: &ProductId) -> Result<QuantityUpdate, SessionError> {
        self.step_quantity(id, -1)
    }

    fn step_quantity(
        &mut self,
        id: &ProductId,
        step: i64,
    ) -> Result<QuantityUpdate, SessionError> {
        let current = self
            .ledger
            .get(id)
            .map(|item| i64::from(item.quantity()))
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        Ok(self.ledger.update_quantity(id, current + step)?)
    }

    /// Exact cart subtotal.
    ///
    /// # Errors
    ///
    /// Returns a ledger error on overflow.
    pub fn subtotal(&self) -> Result<Price, SessionError> {
        Ok(self.ledger.subtotal()?)
    }

    /// Unrounded tax at the session rate.
    ///
    /// # Errors
    ///
    /// Returns a ledger error on overflow.
    pub fn tax(&self) -> Result<ExactAmount, SessionError> {
        Ok(self.ledger.tax(self.tax_rate)?)
    }

    /// Unrounded total at the session rate.
    ///
    /// # Errors
    ///
    /// Returns a ledger error on overflow.
    pub fn total(&self) -> Result<ExactAmount, SessionError> {
        Ok(self.ledger.total(self.tax_rate)?)
    }

    /// Session id, also used as the sale id on the receipt.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Operator running the sale.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Tax rate in force.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// When the session was opened.
    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    /// The cart.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the cart, for edits the session does not wrap.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Customer details.
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Attach customer details.
    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = customer;
    }

    /// Complete the sale now.
    ///
    /// # Errors
    ///
    /// See [`SaleSession::complete_at`].
    pub fn complete(self) -> Result<SaleReceipt, SessionError> {
        self.complete_at(Timestamp::now())
    }

    /// Complete the sale, stamping the receipt with `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyCart`] carrying the untouched session if the cart is
    /// empty, or a ledger error if totals overflow.
    pub fn complete_at(self, completed_at: Timestamp) -> Result<SaleReceipt, SessionError> {
        if self.ledger.is_empty() {
            return Err(SessionError::EmptyCart(Box::new(self)));
        }

        let receipt = SaleReceipt::from_ledger(
            self.id,
            self.actor,
            self.customer,
            &self.ledger,
            self.tax_rate,
            completed_at,
        )?;

        info!(
            sale = %receipt.sale_id(),
            lines = receipt.lines().len(),
            total = %receipt.total(),
            "sale completed"
        );

        Ok(receipt)
    }

    /// Discard the session and its cart.
    pub fn cancel(self) {
        info!(sale = %self.id, lines = self.ledger.len(), "sale cancelled");
    }
}
