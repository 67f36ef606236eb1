//! Grocer
//!
//! Grocer is a single-user, interactive grocery ordering shell. Customers build a cart
//! from a fixed catalog, check out, get an invoice and can leave feedback. Finalized
//! transactions and feedback are appended to flat JSON logs.

pub mod cart;
pub mod feedback;
pub mod input;
pub mod invoice;
pub mod logging;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod records;
pub mod report;
pub mod settings;
pub mod shell;
pub mod store;
pub mod uuids;
