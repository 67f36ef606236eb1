//! Cart
//!
//! A cart tracks two independent quantity partitions per product: items in the cart
//! (`active`) and items saved for later (`saved`). Quantities stored in either
//! partition are always positive; an entry that would reach zero is removed instead.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    prices::{Price, PriceTable},
    pricing::{MissingPrice, PricingError, total_price},
    products::{Catalog, ProductId},
};

/// Product id to quantity mapping, ordered by product id.
pub type Quantities = BTreeMap<ProductId, i64>;

/// How `add` treats zero or negative quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddPolicy {
    /// Refuse the operation and leave the cart untouched.
    #[default]
    Reject,

    /// Apply the value as a delta, dropping the entry if it falls to zero or below.
    Apply,
}

/// The partition a transfer draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Items in the cart.
    Active,

    /// Items saved for later.
    Saved,
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Partition::Active => f.write_str("in cart"),
            Partition::Saved => f.write_str("available in saved-for-later"),
        }
    }
}

/// Reasons a cart operation was refused. None of these end the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product is not in the catalog.
    #[error("Product ID {0} does not exist.")]
    UnknownProduct(ProductId),

    /// The product has no quantity in the cart.
    #[error("Product ID {0} is not in the cart.")]
    NotInCart(ProductId),

    /// The product has no saved-for-later quantity.
    #[error("Product ID {0} is not in saved-for-later list.")]
    NotSaved(ProductId),

    /// A transfer asked for more than the source partition holds.
    #[error("Cannot transfer {requested} of product {product}. Only {available} {from}.")]
    InsufficientQuantity {
        /// Product being transferred
        product: ProductId,
        /// Quantity asked for
        requested: i64,
        /// Quantity held by the source partition
        available: i64,
        /// Source partition
        from: Partition,
    },

    /// The quantity must be positive for this operation.
    #[error("Quantity must be positive, got {0}.")]
    InvalidQuantity(i64),

    /// The resulting quantity does not fit.
    #[error("Quantity of product {0} is too large.")]
    QuantityOverflow(ProductId),
}

/// Shopping cart with active and saved-for-later partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    active: Quantities,
    saved: Quantities,
    add_policy: AddPolicy,
}

impl Cart {
    /// Create an empty cart that rejects non-positive additions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cart with the given add policy.
    pub fn with_policy(add_policy: AddPolicy) -> Self {
        Self {
            add_policy,
            ..Self::default()
        }
    }

    /// Add `quantity` of a product to the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownProduct`]: the product is not in the catalog.
    /// - [`CartError::InvalidQuantity`]: `quantity` is not positive under [`AddPolicy::Reject`].
    /// - [`CartError::QuantityOverflow`]: the new quantity does not fit.
    pub fn add(
        &mut self,
        catalog: &Catalog,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        ensure_known(catalog, product)?;

        if quantity <= 0 && self.add_policy == AddPolicy::Reject {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let updated = self
            .quantity(product)
            .checked_add(quantity)
            .ok_or(CartError::QuantityOverflow(product))?;

        if updated > 0 {
            self.active.insert(product, updated);
        } else {
            self.active.remove(&product);
        }

        debug!(%product, quantity, updated, "added to cart");

        Ok(())
    }

    /// Overwrite the cart quantity of a product. Zero or below removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if the product is not in the catalog.
    pub fn update(
        &mut self,
        catalog: &Catalog,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        ensure_known(catalog, product)?;

        if quantity <= 0 {
            self.remove(product);
        } else {
            self.active.insert(product, quantity);
            debug!(%product, quantity, "updated cart quantity");
        }

        Ok(())
    }

    /// Remove a product from the cart. Removing an absent product does nothing.
    ///
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, product: ProductId) -> bool {
        let removed = self.active.remove(&product).is_some();

        debug!(%product, removed, "removed from cart");

        removed
    }

    /// Move `quantity` of a product from the cart to the saved-for-later list.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownProduct`]: the product is not in the catalog.
    /// - [`CartError::InvalidQuantity`]: `quantity` is not positive.
    /// - [`CartError::NotInCart`]: the product is not in the cart.
    /// - [`CartError::InsufficientQuantity`]: the cart holds less than `quantity`.
    /// - [`CartError::QuantityOverflow`]: the saved quantity would not fit.
    pub fn save_for_later(
        &mut self,
        catalog: &Catalog,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        ensure_known(catalog, product)?;

        transfer(
            &mut self.active,
            &mut self.saved,
            Partition::Active,
            product,
            quantity,
        )?;

        debug!(%product, quantity, "saved for later");

        Ok(())
    }

    /// Move `quantity` of a product from the saved-for-later list back to the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::UnknownProduct`]: the product is not in the catalog.
    /// - [`CartError::InvalidQuantity`]: `quantity` is not positive.
    /// - [`CartError::NotSaved`]: the product is not saved for later.
    /// - [`CartError::InsufficientQuantity`]: fewer than `quantity` are saved.
    /// - [`CartError::QuantityOverflow`]: the cart quantity would not fit.
    pub fn move_to_cart(
        &mut self,
        catalog: &Catalog,
        product: ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        ensure_known(catalog, product)?;

        transfer(
            &mut self.saved,
            &mut self.active,
            Partition::Saved,
            product,
            quantity,
        )?;

        debug!(%product, quantity, "moved to cart");

        Ok(())
    }

    /// Total cost of the items in the cart. Saved items are excluded.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a price is missing under [`MissingPrice::Reject`],
    /// or if the total overflows.
    pub fn total(&self, prices: &PriceTable, policy: MissingPrice) -> Result<Price, PricingError> {
        total_price(&self.active, prices, policy)
    }

    /// Quantity of a product in the cart (zero if absent).
    pub fn quantity(&self, product: ProductId) -> i64 {
        self.active.get(&product).copied().unwrap_or(0)
    }

    /// Quantity of a product saved for later (zero if absent).
    pub fn saved_quantity(&self, product: ProductId) -> i64 {
        self.saved.get(&product).copied().unwrap_or(0)
    }

    /// Items in the cart.
    pub fn active(&self) -> &Quantities {
        &self.active
    }

    /// Items saved for later.
    pub fn saved(&self) -> &Quantities {
        &self.saved
    }

    /// Owned copy of the items in the cart, taken at checkout.
    pub fn snapshot(&self) -> Quantities {
        self.active.clone()
    }

    /// Whether the cart has no items (saved items do not count).
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

fn ensure_known(catalog: &Catalog, product: ProductId) -> Result<(), CartError> {
    if catalog.contains(product) {
        Ok(())
    } else {
        Err(CartError::UnknownProduct(product))
    }
}

/// Moves `quantity` from `source` to `target`. Validates everything before touching
/// either map, so a refused transfer leaves both unchanged.
fn transfer(
    source: &mut Quantities,
    target: &mut Quantities,
    from: Partition,
    product: ProductId,
    quantity: i64,
) -> Result<(), CartError> {
    if quantity <= 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }

    let available = match (source.get(&product), from) {
        (Some(available), _) => *available,
        (None, Partition::Active) => return Err(CartError::NotInCart(product)),
        (None, Partition::Saved) => return Err(CartError::NotSaved(product)),
    };

    if quantity > available {
        return Err(CartError::InsufficientQuantity {
            product,
            requested: quantity,
            available,
            from,
        });
    }

    let moved = target
        .get(&product)
        .copied()
        .unwrap_or(0)
        .checked_add(quantity)
        .ok_or(CartError::QuantityOverflow(product))?;

    let remaining = available - quantity;

    if remaining > 0 {
        source.insert(product, remaining);
    } else {
        source.remove(&product);
    }

    target.insert(product, moved);

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use super::*;

    fn id(value: u32) -> ProductId {
        ProductId::new(value).unwrap_or_else(|| unreachable!("test ids are non-zero"))
    }

    fn catalog() -> Catalog {
        [(id(1), "potato"), (id(2), "tomato"), (id(3), "bread")]
            .into_iter()
            .collect()
    }

    fn prices() -> PriceTable {
        let mut prices = PriceTable::new(INR);
        prices.insert(id(1), 200);
        prices.insert(id(2), 150);
        prices
    }

    fn quantities(entries: &[(u32, i64)]) -> Quantities {
        entries.iter().map(|(p, q)| (id(*p), *q)).collect()
    }

    #[test]
    fn add_creates_then_increments() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();

        cart.add(&catalog, id(1), 3)?;
        cart.add(&catalog, id(1), 2)?;

        assert_eq!(cart.active(), &quantities(&[(1, 5)]));

        Ok(())
    }

    #[test]
    fn add_unknown_product_fails_without_mutation() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.add(&catalog(), id(99), 1),
            Err(CartError::UnknownProduct(id(99)))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_rejects_non_positive_by_default() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 2)?;

        assert_eq!(
            cart.add(&catalog, id(1), 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert_eq!(
            cart.add(&catalog, id(1), -1),
            Err(CartError::InvalidQuantity(-1))
        );
        assert_eq!(cart.quantity(id(1)), 2);

        Ok(())
    }

    #[test]
    fn apply_policy_treats_negative_add_as_delta() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::with_policy(AddPolicy::Apply);
        cart.add(&catalog, id(1), 3)?;

        cart.add(&catalog, id(1), -1)?;
        assert_eq!(cart.quantity(id(1)), 2);

        cart.add(&catalog, id(1), -5)?;
        assert!(
            !cart.active().contains_key(&id(1)),
            "entry is dropped rather than stored as non-positive"
        );

        cart.add(&catalog, id(2), 0)?;
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn update_overwrites_quantity() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(2), 4)?;

        cart.update(&catalog, id(2), 6)?;
        assert_eq!(cart.quantity(id(2)), 6);

        cart.update(&catalog, id(3), 1)?;
        assert_eq!(cart.quantity(id(3)), 1);

        Ok(())
    }

    #[test]
    fn update_to_zero_is_remove() -> TestResult {
        let catalog = catalog();
        let mut updated = Cart::new();
        let mut removed = Cart::new();
        updated.add(&catalog, id(1), 3)?;
        removed.add(&catalog, id(1), 3)?;

        updated.update(&catalog, id(1), 0)?;
        removed.remove(id(1));

        assert_eq!(updated, removed);
        assert!(updated.is_empty());

        Ok(())
    }

    #[test]
    fn update_unknown_product_fails() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.update(&catalog(), id(42), 1),
            Err(CartError::UnknownProduct(id(42)))
        );
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut cart = Cart::new();

        assert!(!cart.remove(id(1)));
        assert_eq!(cart, Cart::new());
    }

    #[test]
    fn remove_leaves_saved_items() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 3)?;
        cart.save_for_later(&catalog, id(1), 1)?;

        assert!(cart.remove(id(1)));
        assert_eq!(cart.saved(), &quantities(&[(1, 1)]));

        Ok(())
    }

    #[test]
    fn save_for_later_splits_quantity() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 3)?;

        cart.save_for_later(&catalog, id(1), 2)?;

        assert_eq!(cart.active(), &quantities(&[(1, 1)]));
        assert_eq!(cart.saved(), &quantities(&[(1, 2)]));

        Ok(())
    }

    #[test]
    fn save_everything_drops_active_entry() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(2), 2)?;
        cart.save_for_later(&catalog, id(2), 1)?;

        cart.add(&catalog, id(2), 1)?;
        cart.save_for_later(&catalog, id(2), 2)?;

        assert!(cart.is_empty());
        assert_eq!(cart.saved_quantity(id(2)), 3);

        Ok(())
    }

    #[test]
    fn save_more_than_active_changes_nothing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 2)?;
        let before = cart.clone();

        let result = cart.save_for_later(&catalog, id(1), 3);

        assert_eq!(
            result,
            Err(CartError::InsufficientQuantity {
                product: id(1),
                requested: 3,
                available: 2,
                from: Partition::Active,
            })
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn save_requires_item_in_cart() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.save_for_later(&catalog(), id(1), 1),
            Err(CartError::NotInCart(id(1)))
        );
        assert_eq!(
            cart.save_for_later(&catalog(), id(77), 1),
            Err(CartError::UnknownProduct(id(77)))
        );
    }

    #[test]
    fn transfers_reject_non_positive_quantities() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 2)?;
        cart.save_for_later(&catalog, id(1), 1)?;
        let before = cart.clone();

        assert_eq!(
            cart.save_for_later(&catalog, id(1), 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert_eq!(
            cart.move_to_cart(&catalog, id(1), -1),
            Err(CartError::InvalidQuantity(-1))
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn move_to_cart_requires_saved_item() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 2)?;

        assert_eq!(
            cart.move_to_cart(&catalog, id(1), 1),
            Err(CartError::NotSaved(id(1)))
        );

        Ok(())
    }

    #[test]
    fn move_unknown_product_fails() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 2)?;
        cart.save_for_later(&catalog, id(1), 1)?;
        let before = cart.clone();

        assert_eq!(
            cart.move_to_cart(&catalog, id(55), 1),
            Err(CartError::UnknownProduct(id(55)))
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn add_past_the_maximum_is_refused() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), i64::MAX)?;

        assert_eq!(
            cart.add(&catalog, id(1), 10),
            Err(CartError::QuantityOverflow(id(1)))
        );
        assert_eq!(cart.quantity(id(1)), i64::MAX);

        Ok(())
    }

    #[test]
    fn overflowing_transfer_changes_nothing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), i64::MAX)?;
        cart.save_for_later(&catalog, id(1), i64::MAX)?;
        cart.add(&catalog, id(1), 5)?;
        let before = cart.clone();

        assert_eq!(
            cart.save_for_later(&catalog, id(1), 5),
            Err(CartError::QuantityOverflow(id(1)))
        );
        assert_eq!(cart, before);

        cart.move_to_cart(&catalog, id(1), 1)?;
        cart.add(&catalog, id(2), 1)?;
        cart.save_for_later(&catalog, id(2), 1)?;
        cart.add(&catalog, id(2), i64::MAX)?;
        let before = cart.clone();

        assert_eq!(
            cart.move_to_cart(&catalog, id(2), 1),
            Err(CartError::QuantityOverflow(id(2)))
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn move_more_than_saved_changes_nothing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 4)?;
        cart.save_for_later(&catalog, id(1), 2)?;
        let before = cart.clone();

        let result = cart.move_to_cart(&catalog, id(1), 3);

        assert!(matches!(
            result,
            Err(CartError::InsufficientQuantity {
                requested: 3,
                available: 2,
                from: Partition::Saved,
                ..
            })
        ));
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn save_then_move_restores_cart() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 3)?;
        cart.add(&catalog, id(2), 1)?;
        let before = cart.clone();

        for quantity in 1..=3 {
            cart.save_for_later(&catalog, id(1), quantity)?;
            cart.move_to_cart(&catalog, id(1), quantity)?;

            assert_eq!(cart, before, "round trip of {quantity} restores the cart");
        }

        Ok(())
    }

    #[test]
    fn product_can_be_both_active_and_saved() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 5)?;
        cart.save_for_later(&catalog, id(1), 2)?;

        assert_eq!(cart.quantity(id(1)), 3);
        assert_eq!(cart.saved_quantity(id(1)), 2);

        Ok(())
    }

    #[test]
    fn total_excludes_saved_items() -> TestResult {
        let catalog = catalog();
        let prices = prices();
        let mut cart = Cart::new();
        cart.add(&catalog, id(1), 3)?;
        cart.add(&catalog, id(2), 2)?;
        cart.save_for_later(&catalog, id(2), 2)?;

        assert_eq!(
            cart.total(&prices, MissingPrice::Zero)?,
            Money::from_minor(600, INR)
        );

        Ok(())
    }

    #[test]
    fn add_increases_total_by_line_price() -> TestResult {
        let catalog = catalog();
        let prices = prices();
        let mut cart = Cart::new();
        cart.add(&catalog, id(2), 1)?;
        let before = cart.total(&prices, MissingPrice::Zero)?;

        cart.add(&catalog, id(1), 4)?;
        let after = cart.total(&prices, MissingPrice::Zero)?;

        assert_eq!(after.to_minor_units() - before.to_minor_units(), 4 * 200);

        Ok(())
    }

    #[test]
    fn empty_cart_totals_zero() -> TestResult {
        let total = Cart::new().total(&prices(), MissingPrice::Reject)?;

        assert_eq!(total, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn potato_scenario() -> TestResult {
        let catalog: Catalog = [(id(1), "potato")].into_iter().collect();
        let mut prices = PriceTable::new(INR);
        prices.insert(id(1), 200);
        let mut cart = Cart::new();

        cart.add(&catalog, id(1), 3)?;
        assert_eq!(
            crate::prices::decimal_from_price(&cart.total(&prices, MissingPrice::Zero)?),
            Decimal::new(600, 2)
        );

        cart.save_for_later(&catalog, id(1), 2)?;
        assert_eq!(cart.active(), &quantities(&[(1, 1)]));
        assert_eq!(cart.saved(), &quantities(&[(1, 2)]));

        cart.move_to_cart(&catalog, id(1), 2)?;
        assert_eq!(cart.active(), &quantities(&[(1, 3)]));
        assert!(cart.saved().is_empty());
        assert_eq!(cart.snapshot(), quantities(&[(1, 3)]));

        Ok(())
    }
}
