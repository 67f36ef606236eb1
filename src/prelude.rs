//! Grocer prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{AddPolicy, Cart, CartError, Partition, Quantities},
    invoice::{Invoice, InvoiceError},
    prices::{Price, PriceTable},
    pricing::{MissingPrice, PricingError},
    products::{Catalog, ProductId},
    records::{FeedbackRecord, TransactionId, TransactionRecord},
    settings::{Args, Settings},
    shell::{Outcome, Session, SessionOptions, ShellError},
    store::{CatalogStore, FeedbackLog, JsonStore, StoreError, TransactionLog},
};
