//! Prices

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};

use crate::products::ProductId;

/// Unit or line price in the session currency.
pub type Price = Money<'static, Currency>;

/// Look up a supported currency by ISO code (case-insensitive).
pub fn parse_currency(code: &str) -> Option<&'static Currency> {
    match code.trim().to_ascii_uppercase().as_str() {
        "INR" => Some(INR),
        "GBP" => Some(GBP),
        "USD" => Some(USD),
        "EUR" => Some(EUR),
        _ => None,
    }
}

/// Convert a decimal amount (e.g. `3.65`) into money, rounding to minor units.
///
/// Returns `None` for negative amounts or amounts that overflow the minor unit range.
pub fn price_from_decimal(amount: Decimal, currency: &'static Currency) -> Option<Price> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return None;
    }

    let scale = 10_i64.checked_pow(currency.exponent)?;

    let minor_units = amount
        .checked_mul(Decimal::from(scale))
        .and_then(|value| value.round_dp(0).to_i64())?;

    Some(Money::from_minor(minor_units, currency))
}

/// Decimal amount of a price, in major units.
pub fn decimal_from_price(price: &Price) -> Decimal {
    Decimal::new(price.to_minor_units(), price.currency().exponent)
}

/// Read-only unit price table.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: FxHashMap<ProductId, Price>,
    currency: &'static Currency,
}

impl PriceTable {
    /// Create an empty price table in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            prices: FxHashMap::default(),
            currency,
        }
    }

    /// Set the unit price of a product.
    ///
    /// Only used while the table is being loaded; the table is read-only afterwards.
    pub fn insert(&mut self, id: ProductId, minor_units: i64) {
        self.prices
            .insert(id, Money::from_minor(minor_units, self.currency));
    }

    /// Unit price of a product, if listed.
    pub fn get(&self, id: ProductId) -> Option<&Price> {
        self.prices.get(&id)
    }

    /// Prices sorted by product id.
    pub fn sorted(&self) -> Vec<(ProductId, &Price)> {
        let mut prices: Vec<_> = self.prices.iter().map(|(id, price)| (*id, price)).collect();
        prices.sort_unstable_by_key(|(id, _)| *id);
        prices
    }

    /// Zero in the table currency.
    pub fn zero(&self) -> Price {
        Money::from_minor(0, self.currency)
    }

    /// Currency shared by every price in the table.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of listed prices.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no prices are listed.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
