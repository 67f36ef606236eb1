//! Invoice

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    prices::{Price, PriceTable},
    pricing::{MissingPrice, PricingError, line_total, total_price, unit_price},
    products::Catalog,
    records::{TransactionId, TransactionRecord},
};

/// Errors that can occur when building or printing an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Error pricing a line or the total.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("failed to write invoice: {0}")]
    Io(#[from] io::Error),
}

/// One priced invoice line.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    /// Product display name
    pub name: String,

    /// Quantity purchased
    pub quantity: i64,

    /// Unit price
    pub unit_price: Price,

    /// Quantity times unit price
    pub line_total: Price,
}

/// Printable invoice for a recorded transaction.
#[derive(Debug, Clone)]
pub struct Invoice {
    transaction_id: TransactionId,
    lines: Vec<InvoiceLine>,
    total: Price,
    timestamp: String,
}

impl Invoice {
    /// Price every line of a recorded transaction.
    ///
    /// # Errors
    ///
    /// Returns an [`InvoiceError`] if a price is missing under [`MissingPrice::Reject`]
    /// or an amount overflows.
    pub fn new(
        record: &TransactionRecord,
        catalog: &Catalog,
        prices: &PriceTable,
        policy: MissingPrice,
    ) -> Result<Self, InvoiceError> {
        let lines = record
            .items
            .iter()
            .map(|(product, quantity)| {
                let unit_price = unit_price(prices, *product, policy)?;

                Ok(InvoiceLine {
                    name: catalog.display_name(*product).to_string(),
                    quantity: *quantity,
                    unit_price,
                    line_total: line_total(&unit_price, *quantity)?,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Self {
            transaction_id: record.transaction_id,
            lines,
            total: total_price(&record.items, prices, policy)?,
            timestamp: record.timestamp.clone(),
        })
    }

    /// Priced lines in product id order.
    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    /// Grand total.
    pub fn total(&self) -> Price {
        self.total
    }

    /// Prints the invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), InvoiceError> {
        let mut builder = Builder::default();

        builder.push_record(["ITEM", "QUANTITY", "PRICE", "TOTAL"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "\nINVOICE")?;
        writeln!(out, "Transaction ID: {}", self.transaction_id)?;
        writeln!(out, "{table}")?;
        writeln!(out, "Total: {}", self.total)?;
        writeln!(out, "Timestamp: {}\n", self.timestamp)?;

        Ok(())
    }
}
