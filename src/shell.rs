//! Interactive shell
//!
//! Reads commands from any [`BufRead`] and writes to any [`Write`], so the whole
//! session can be driven from tests with in-memory buffers.

use std::{
    fmt::{self, Debug, Formatter},
    io::{self, BufRead, Write},
};

use rusty_money::iso::Currency;
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cart::{AddPolicy, Cart, CartError},
    feedback::collect_feedback,
    input::{Action, InputError, parse_product, parse_product_quantity},
    invoice::{Invoice, InvoiceError},
    prices::{PriceTable, decimal_from_price},
    pricing::MissingPrice,
    products::{Catalog, ProductId},
    records::{TransactionId, TransactionRecord},
    report::write_report,
    settings::Settings,
    store::{CatalogStore, FeedbackLog, StoreError, TransactionLog},
};

const ACTION_PROMPT: &str = "\nEnter action (add/update/remove/save/move/view/done): ";
const ADD_PROMPT: &str = "Enter product_id,quantity (e.g., 1,12): ";
const UPDATE_PROMPT: &str = "Enter product_id,quantity (e.g., 2,6): ";
const REMOVE_PROMPT: &str = "Enter product_id to remove: ";
const SAVE_PROMPT: &str = "Enter product_id,quantity to save for later (e.g., 1,12): ";
const MOVE_PROMPT: &str = "Enter product_id,quantity to move to cart (e.g., 1,12): ";

/// Errors that end a session. Cart and input problems are reported to the user instead.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Console IO error
    #[error("console IO error: {0}")]
    Io(#[from] io::Error),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invoice error
    #[error(transparent)]
    Invoice(#[from] InvoiceError),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A transaction was recorded.
    Recorded(TransactionRecord),

    /// The session ended without recording anything.
    Abandoned,
}

/// Per-session behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// How zero or negative `add` quantities are handled
    pub add_policy: AddPolicy,

    /// How products without a listed price are totalled
    pub missing_price: MissingPrice,

    /// Whether to print the storage report at the end
    pub show_report: bool,
}

impl From<&Settings> for SessionOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            add_policy: settings.add_policy,
            missing_price: settings.missing_price,
            show_report: settings.show_report,
        }
    }
}

/// One shopping session: a catalog loaded once, a cart, and the logs it writes to.
pub struct Session<'s> {
    catalog: Catalog,
    prices: PriceTable,
    cart: Cart,
    options: SessionOptions,
    transaction_id: TransactionId,
    transactions: &'s dyn TransactionLog,
    feedback: &'s dyn FeedbackLog,
}

impl Debug for Session<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("catalog", &self.catalog)
            .field("cart", &self.cart)
            .field("options", &self.options)
            .field("transaction_id", &self.transaction_id)
            .finish_non_exhaustive()
    }
}

impl<'s> Session<'s> {
    /// Create a session over an already loaded catalog and price table.
    pub fn new(
        catalog: Catalog,
        prices: PriceTable,
        options: SessionOptions,
        transactions: &'s dyn TransactionLog,
        feedback: &'s dyn FeedbackLog,
    ) -> Self {
        Self {
            catalog,
            prices,
            cart: Cart::with_policy(options.add_policy),
            options,
            transaction_id: TransactionId::now_v7(),
            transactions,
            feedback,
        }
    }

    /// Load the catalog and prices once, then create a session over them.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the catalog or prices cannot be loaded.
    pub fn open(
        catalog_store: &dyn CatalogStore,
        currency: &'static Currency,
        options: SessionOptions,
        transactions: &'s dyn TransactionLog,
        feedback: &'s dyn FeedbackLog,
    ) -> Result<Self, StoreError> {
        let catalog = catalog_store.load_products()?;
        let prices = catalog_store.load_prices(currency)?;

        Ok(Self::new(catalog, prices, options, transactions, feedback))
    }

    /// The session cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Identifier the transaction will be recorded under.
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Run the command loop until `done` or end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] on console IO or storage failures.
    pub fn run(
        &mut self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<Outcome, ShellError> {
        self.write_welcome(out)?;

        loop {
            prompt(out, ACTION_PROMPT)?;

            let Some(line) = read_line(input)? else {
                debug!("end of input, checking out");

                return match self.checkout(input, out)? {
                    Some(outcome) => Ok(outcome),
                    None => self.abandon(out),
                };
            };

            match line.parse::<Action>() {
                Ok(action) => {
                    if let Some(outcome) = self.apply(action, input, out)? {
                        return Ok(outcome);
                    }
                }
                Err(_) => writeln!(out, "Invalid action. Please try again.")?,
            }
        }
    }

    fn write_welcome(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Welcome to the Grocery App!")?;
        writeln!(out, "Available products:")?;

        for (product, name) in self.catalog.iter() {
            let price = self
                .prices
                .get(product)
                .copied()
                .unwrap_or_else(|| self.prices.zero());

            writeln!(out, "{product}: {name} ({price})")?;
        }

        Ok(())
    }

    /// Run one action. Returns the outcome once `done` ends the session.
    fn apply(
        &mut self,
        action: Action,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<Option<Outcome>, ShellError> {
        debug!(?action, "applying action");

        match action {
            Action::Add => {
                let Some((product, quantity)) = read_pair(input, out, ADD_PROMPT)? else {
                    return Ok(None);
                };

                let result = self
                    .cart
                    .add(&self.catalog, product, quantity)
                    .map(|()| format!("Added {quantity} of {} to cart.", self.name(product)));

                write_result(out, result)?;
            }
            Action::Update => {
                let Some((product, quantity)) = read_pair(input, out, UPDATE_PROMPT)? else {
                    return Ok(None);
                };

                let result = self
                    .cart
                    .update(&self.catalog, product, quantity)
                    .map(|()| format!("Updated {} to quantity {quantity}.", self.name(product)));

                write_result(out, result)?;
            }
            Action::Remove => {
                prompt(out, REMOVE_PROMPT)?;

                let Some(line) = read_line(input)? else {
                    return Ok(None);
                };

                match parse_product(&line) {
                    Ok(product) => {
                        self.cart.remove(product);
                        writeln!(out, "Removed {} from cart.", self.name(product))?;
                    }
                    Err(err) => writeln!(out, "Invalid input: {err}. Enter a valid product_id.")?,
                }
            }
            Action::Save => {
                let Some((product, quantity)) = read_pair(input, out, SAVE_PROMPT)? else {
                    return Ok(None);
                };

                let result = self
                    .cart
                    .save_for_later(&self.catalog, product, quantity)
                    .map(|()| format!("Saved {quantity} of {} for later.", self.name(product)));

                write_result(out, result)?;
            }
            Action::Move => {
                let Some((product, quantity)) = read_pair(input, out, MOVE_PROMPT)? else {
                    return Ok(None);
                };

                let result = self
                    .cart
                    .move_to_cart(&self.catalog, product, quantity)
                    .map(|()| format!("Moved {quantity} of {} to cart.", self.name(product)));

                write_result(out, result)?;
            }
            Action::View => self.write_saved(out)?,
            Action::Done => return self.checkout(input, out),
        }

        Ok(None)
    }

    fn name(&self, product: ProductId) -> &str {
        self.catalog.display_name(product)
    }

    fn write_saved(&self, out: &mut impl Write) -> io::Result<()> {
        if self.cart.saved().is_empty() {
            return writeln!(out, "No items saved for later.");
        }

        let mut builder = Builder::default();
        builder.push_record(["Saved Items", "Quantity"]);

        for (product, quantity) in self.cart.saved() {
            builder.push_record([self.name(*product).to_string(), quantity.to_string()]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());

        writeln!(out, "\n{table}")
    }

    /// Record the cart, print the invoice and collect feedback.
    ///
    /// Returns `None` when the cart cannot be priced; the user can fix the cart and retry.
    fn checkout(
        &mut self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<Option<Outcome>, ShellError> {
        if self.cart.is_empty() {
            writeln!(out, "Cart is empty. Exiting without saving transaction.")?;
            self.write_report(out)?;

            return Ok(Some(Outcome::Abandoned));
        }

        let total = match self.cart.total(&self.prices, self.options.missing_price) {
            Ok(total) => total,
            Err(err) => {
                writeln!(out, "Cannot check out: {err}")?;
                return Ok(None);
            }
        };

        let record = self.transactions.append(
            self.transaction_id,
            &self.cart.snapshot(),
            decimal_from_price(&total),
        )?;

        info!(
            transaction_id = %record.transaction_id,
            total = %record.total,
            "checked out"
        );

        Invoice::new(
            &record,
            &self.catalog,
            &self.prices,
            self.options.missing_price,
        )?
        .write_to(&mut *out)?;

        collect_feedback(input, out, self.feedback, record.transaction_id)?;

        self.write_report(out)?;
        writeln!(out, "Transaction completed. Exiting...")?;

        Ok(Some(Outcome::Recorded(record)))
    }

    fn abandon(&self, out: &mut impl Write) -> Result<Outcome, ShellError> {
        writeln!(out, "Exiting without saving transaction.")?;
        self.write_report(out)?;

        Ok(Outcome::Abandoned)
    }

    fn write_report(&self, out: &mut impl Write) -> Result<(), ShellError> {
        if !self.options.show_report {
            return Ok(());
        }

        let transactions = self.transactions.transactions()?;
        let feedback = self.feedback.feedback()?;

        write_report(out, &self.catalog, &self.prices, &transactions, &feedback)?;

        Ok(())
    }
}

/// Write a prompt without a trailing newline.
pub(crate) fn prompt(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{text}")?;
    out.flush()
}

/// Read one line without its terminator. `None` at end of input.
pub(crate) fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();

    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_string()))
}

fn read_pair(
    input: &mut impl BufRead,
    out: &mut impl Write,
    text: &str,
) -> Result<Option<(ProductId, i64)>, ShellError> {
    prompt(out, text)?;

    let Some(line) = read_line(input)? else {
        return Ok(None);
    };

    match parse_product_quantity(&line) {
        Ok(pair) => Ok(Some(pair)),
        Err(err) => {
            write_input_error(out, &err)?;
            Ok(None)
        }
    }
}

fn write_input_error(out: &mut impl Write, err: &InputError) -> io::Result<()> {
    writeln!(out, "Invalid input: {err}. Use format: product_id,quantity")
}

fn write_result(out: &mut impl Write, result: Result<String, CartError>) -> io::Result<()> {
    match result {
        Ok(message) => writeln!(out, "{message}"),
        Err(err) => {
            debug!(%err, "cart operation refused");
            writeln!(out, "{err}")
        }
    }
}
