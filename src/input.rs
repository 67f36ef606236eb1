//! Shell input parsing
//!
//! Turns raw console lines into typed actions and arguments. Nothing here touches the
//! cart; malformed input is reported to the user and never reaches it.

use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

use crate::products::{ProductId, ProductIdError};

/// Errors for lines that do not match the expected argument shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// Wrong number of comma separated values.
    #[error("expected {expected} value(s), got {found}")]
    Arity {
        /// Values expected
        expected: usize,
        /// Values found
        found: usize,
    },

    /// A value is not an integer.
    #[error("{0:?} is not a whole number")]
    NotANumber(String),

    /// The product id is not a positive integer.
    #[error(transparent)]
    ProductId(#[from] ProductIdError),
}

/// A shell command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Add to the cart
    Add,
    /// Overwrite a cart quantity
    Update,
    /// Remove from the cart
    Remove,
    /// Save for later
    Save,
    /// Move back from saved-for-later
    Move,
    /// Show saved-for-later items
    View,
    /// Check out and exit
    Done,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "update" => Ok(Self::Update),
            "remove" => Ok(Self::Remove),
            "save" => Ok(Self::Save),
            "move" => Ok(Self::Move),
            "view" => Ok(Self::View),
            "done" => Ok(Self::Done),
            other => Err(other.to_string()),
        }
    }
}

/// Split a comma separated line into integers.
///
/// # Errors
///
/// Returns [`InputError::NotANumber`] if any value is not an integer.
pub fn parse_numbers(line: &str) -> Result<SmallVec<[i64; 2]>, InputError> {
    line.split(',')
        .map(|value| {
            let value = value.trim();

            value
                .parse::<i64>()
                .map_err(|_err| InputError::NotANumber(value.to_string()))
        })
        .collect()
}

/// Parse `product_id,quantity`.
///
/// # Errors
///
/// Returns an [`InputError`] for the wrong number of values, non-integers, or a
/// non-positive product id.
pub fn parse_product_quantity(line: &str) -> Result<(ProductId, i64), InputError> {
    match parse_numbers(line)?.as_slice() {
        [product, quantity] => Ok((ProductId::try_from(*product)?, *quantity)),
        other => Err(InputError::Arity {
            expected: 2,
            found: other.len(),
        }),
    }
}

/// Parse a lone `product_id`.
///
/// # Errors
///
/// Returns an [`InputError`] for the wrong number of values, a non-integer, or a
/// non-positive product id.
pub fn parse_product(line: &str) -> Result<ProductId, InputError> {
    match parse_numbers(line)?.as_slice() {
        [product] => Ok(ProductId::try_from(*product)?),
        other => Err(InputError::Arity {
            expected: 1,
            found: other.len(),
        }),
    }
}
