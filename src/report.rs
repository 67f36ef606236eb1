//! Storage report
//!
//! Tables of everything currently held by the stores, printed when a session ends.

use std::io;

use tabled::{builder::Builder, settings::Style};

use crate::{
    cart::Quantities,
    prices::PriceTable,
    products::Catalog,
    records::{FeedbackRecord, TransactionRecord},
};

/// Write the products, prices, transactions and feedback tables.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_report(
    mut out: impl io::Write,
    catalog: &Catalog,
    prices: &PriceTable,
    transactions: &[TransactionRecord],
    feedback: &[FeedbackRecord],
) -> io::Result<()> {
    writeln!(out, "\n=== Stored Records ===")?;

    let mut products = Builder::default();
    products.push_record(["Product ID", "Name"]);
    for (product, name) in catalog.iter() {
        products.push_record([product.to_string(), name.to_string()]);
    }
    write_section(&mut out, "Products", products)?;

    let mut pricing = Builder::default();
    pricing.push_record(["Product ID", "Price"]);
    for (product, price) in prices.sorted() {
        pricing.push_record([product.to_string(), price.to_string()]);
    }
    write_section(&mut out, "Pricing", pricing)?;

    let mut history = Builder::default();
    history.push_record(["Transaction ID", "Items", "Total", "Timestamp"]);
    for transaction in transactions {
        history.push_record([
            transaction.transaction_id.to_string(),
            join_items(&transaction.items),
            format!("{:.2}", transaction.total),
            transaction.timestamp.clone(),
        ]);
    }
    write_section(&mut out, "Transactions", history)?;

    let mut comments = Builder::default();
    comments.push_record(["Transaction ID", "Feedback", "Timestamp"]);
    for entry in feedback {
        comments.push_record([
            entry.transaction_id.to_string(),
            entry.feedback.clone(),
            entry.timestamp.clone(),
        ]);
    }
    write_section(&mut out, "Feedback", comments)?;

    writeln!(out, "\n=== End of Stored Records ===\n")
}

/// `id:quantity` pairs joined with `;`.
fn join_items(items: &Quantities) -> String {
    items
        .iter()
        .map(|(product, quantity)| format!("{product}:{quantity}"))
        .collect::<Vec<_>>()
        .join(";")
}

fn write_section(out: &mut impl io::Write, title: &str, builder: Builder) -> io::Result<()> {
    let mut table = builder.build();
    table.with(Style::modern_rounded());

    writeln!(out, "\n{title}:")?;
    writeln!(out, "{table}")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::{products::ProductId, records::TransactionId};

    use super::*;

    fn id(value: u32) -> ProductId {
        ProductId::new(value).unwrap_or_else(|| unreachable!("test ids are non-zero"))
    }

    #[test]
    fn report_lists_every_store() -> TestResult {
        let catalog: Catalog = [(id(1), "potato"), (id(2), "tomato")].into_iter().collect();
        let mut prices = PriceTable::new(INR);
        prices.insert(id(1), 200);
        let transaction_id = TransactionId::now_v7();

        let transactions = [TransactionRecord {
            transaction_id,
            items: [(id(1), 3), (id(2), 1)].into_iter().collect(),
            total: Decimal::new(75, 1),
            timestamp: "2024-05-01 10:00:00".to_string(),
        }];
        let feedback = [FeedbackRecord {
            transaction_id,
            feedback: "great tomatoes".to_string(),
            timestamp: "2024-05-01 10:01:00".to_string(),
        }];

        let mut out = Vec::new();
        write_report(&mut out, &catalog, &prices, &transactions, &feedback)?;
        let output = String::from_utf8(out)?;

        assert!(output.contains("Products:"));
        assert!(output.contains("tomato"));
        assert!(output.contains("Pricing:"));
        assert!(output.contains("1:3;2:1"));
        assert!(output.contains("7.50"));
        assert!(output.contains("great tomatoes"));
        assert!(output.contains("End of Stored Records"));

        Ok(())
    }

    #[test]
    fn empty_stores_still_render_headers() -> TestResult {
        let mut out = Vec::new();
        write_report(&mut out, &Catalog::new(), &PriceTable::new(INR), &[], &[])?;
        let output = String::from_utf8(out)?;

        assert!(output.contains("Transaction ID"));
        assert!(output.contains("Feedback:"));

        Ok(())
    }
}
