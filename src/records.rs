//! Persisted records

use jiff::Zoned;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{cart::Quantities, uuids::TypedUuid};

/// Timestamp layout used by every persisted record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Transaction identifier.
pub type TransactionId = TypedUuid<TransactionRecord>;

/// A finalized purchase. Never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Generated identifier
    pub transaction_id: TransactionId,

    /// Items in the cart at checkout
    pub items: Quantities,

    /// Total charged, in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Local time the record was written
    pub timestamp: String,
}

/// Free-text feedback attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Transaction the feedback refers to
    pub transaction_id: TransactionId,

    /// Feedback body
    pub feedback: String,

    /// Local time the record was written
    pub timestamp: String,
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Zoned::now().strftime(TIMESTAMP_FORMAT).to_string()
}
