//! Storage
//!
//! The catalog, price table and the two append-only logs sit behind traits so the
//! session never touches files directly. [`JsonStore`] keeps everything in flat JSON
//! files inside a single data directory.

use std::io;

use mockall::automock;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::Quantities,
    prices::PriceTable,
    products::Catalog,
    records::{FeedbackRecord, TransactionId, TransactionRecord},
};

mod json;

pub use json::JsonStore;

/// Storage errors. These are fatal for the session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading or writing a store file
    #[error("failed to access store file: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or encoding error
    #[error("failed to parse store file: {0}")]
    Json(#[from] serde_json::Error),

    /// A product id key is not a positive integer
    #[error("invalid product id in store: {0:?}")]
    InvalidProductId(String),

    /// A price is negative or too large
    #[error("invalid price for product {product}: {price}")]
    InvalidPrice {
        /// Product the price belongs to
        product: String,
        /// Offending amount
        price: Decimal,
    },
}

/// Source of the read-only catalog and price table.
#[automock]
pub trait CatalogStore {
    /// Load the product catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the catalog cannot be read or contains invalid ids.
    fn load_products(&self) -> Result<Catalog, StoreError>;

    /// Load unit prices in the given currency.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the prices cannot be read or are invalid.
    fn load_prices(&self, currency: &'static Currency) -> Result<PriceTable, StoreError>;
}

/// Append-only log of finalized purchases.
#[automock]
pub trait TransactionLog {
    /// Append a transaction and return the record as written.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the log cannot be read or written.
    fn append(
        &self,
        transaction_id: TransactionId,
        items: &Quantities,
        total: Decimal,
    ) -> Result<TransactionRecord, StoreError>;

    /// Every transaction recorded so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the log cannot be read.
    fn transactions(&self) -> Result<Vec<TransactionRecord>, StoreError>;
}

/// Append-only log of customer feedback.
#[automock]
pub trait FeedbackLog {
    /// Append feedback for a transaction and return the record as written.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the log cannot be read or written.
    fn append(
        &self,
        transaction_id: TransactionId,
        feedback: &str,
    ) -> Result<FeedbackRecord, StoreError>;

    /// Every feedback entry recorded so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the log cannot be read.
    fn feedback(&self) -> Result<Vec<FeedbackRecord>, StoreError>;
}
