//! Pricing

use clap::ValueEnum;
use rusty_money::Money;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    prices::{Price, PriceTable},
    products::ProductId,
};

/// How totals treat a product that has no listed price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPrice {
    /// Charge nothing for the product.
    #[default]
    Zero,

    /// Refuse to compute the total.
    Reject,
}

/// Errors that can occur while calculating a total.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A product has no price and the policy forbids pricing it at zero.
    #[error("No price listed for product {0}.")]
    MissingPrice(ProductId),

    /// The total does not fit in the minor unit range.
    #[error("Total is too large to represent.")]
    Overflow,
}

/// Unit price of a product under the given policy.
///
/// # Errors
///
/// Returns [`PricingError::MissingPrice`] if the product is unlisted under [`MissingPrice::Reject`].
pub fn unit_price(
    prices: &PriceTable,
    product: ProductId,
    policy: MissingPrice,
) -> Result<Price, PricingError> {
    match (prices.get(product), policy) {
        (Some(price), _) => Ok(*price),
        (None, MissingPrice::Zero) => Ok(prices.zero()),
        (None, MissingPrice::Reject) => Err(PricingError::MissingPrice(product)),
    }
}

/// Price of `quantity` units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result does not fit.
pub fn line_total(price: &Price, quantity: i64) -> Result<Price, PricingError> {
    price
        .to_minor_units()
        .checked_mul(quantity)
        .map(|minor_units| Money::from_minor(minor_units, price.currency()))
        .ok_or(PricingError::Overflow)
}

/// Calculates the total price of a set of product quantities.
///
/// Arithmetic is done in integer minor units, so the result does not depend on the
/// order entries are visited in.
///
/// # Errors
///
/// - [`PricingError::MissingPrice`]: a product is unlisted under [`MissingPrice::Reject`].
/// - [`PricingError::Overflow`]: the total does not fit.
pub fn total_price<'q>(
    items: impl IntoIterator<Item = (&'q ProductId, &'q i64)>,
    prices: &PriceTable,
    policy: MissingPrice,
) -> Result<Price, PricingError> {
    let total = items
        .into_iter()
        .try_fold(0_i64, |acc, (product, quantity)| {
            let line = line_total(&unit_price(prices, *product, policy)?, *quantity)?;

            acc.checked_add(line.to_minor_units())
                .ok_or(PricingError::Overflow)
        })?;

    Ok(Money::from_minor(total, prices.currency()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, INR};
    use testresult::TestResult;

    use crate::cart::Quantities;

    use super::*;

    fn id(value: u32) -> ProductId {
        ProductId::new(value).unwrap_or_else(|| unreachable!("test ids are non-zero"))
    }

    fn prices() -> PriceTable {
        let mut prices = PriceTable::new(INR);
        prices.insert(id(1), 200);
        prices.insert(id(6), 365);
        prices
    }

    #[test]
    fn total_sums_quantity_times_price() -> TestResult {
        let items: Quantities = [(id(1), 3), (id(6), 2)].into_iter().collect();

        let total = total_price(&items, &prices(), MissingPrice::Zero)?;

        assert_eq!(total, Money::from_minor(600 + 730, INR));

        Ok(())
    }

    #[test]
    fn total_of_nothing_is_zero_in_table_currency() -> TestResult {
        let items = Quantities::new();

        let total = total_price(&items, &PriceTable::new(GBP), MissingPrice::Zero)?;

        assert_eq!(total, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn missing_price_counts_as_zero_by_default() -> TestResult {
        let items: Quantities = [(id(1), 1), (id(9), 5)].into_iter().collect();

        let total = total_price(&items, &prices(), MissingPrice::Zero)?;

        assert_eq!(total, Money::from_minor(200, INR));

        Ok(())
    }

    #[test]
    fn missing_price_can_be_rejected() {
        let items: Quantities = [(id(1), 1), (id(9), 5)].into_iter().collect();

        assert_eq!(
            total_price(&items, &prices(), MissingPrice::Reject),
            Err(PricingError::MissingPrice(id(9)))
        );
    }

    #[test]
    fn line_total_overflow_is_reported() {
        let price = Money::from_minor(i64::MAX, INR);

        assert_eq!(line_total(&price, 2), Err(PricingError::Overflow));
    }

    #[test]
    fn total_overflow_is_reported() {
        let mut prices = PriceTable::new(INR);
        prices.insert(id(1), i64::MAX);
        prices.insert(id(2), 1);
        let items: Quantities = [(id(1), 1), (id(2), 1)].into_iter().collect();

        assert_eq!(
            total_price(&items, &prices, MissingPrice::Zero),
            Err(PricingError::Overflow)
        );
    }
}
