//! Products

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU32,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when turning raw text or numbers into a [`ProductId`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductIdError {
    /// The value was zero or negative.
    #[error("product id must be a positive integer, got {0}")]
    NotPositive(i64),

    /// The value does not fit a product id.
    #[error("product id {0} is out of range")]
    OutOfRange(i64),

    /// The text was not an integer at all.
    #[error("product id must be a positive integer, got {0:?}")]
    NotANumber(String),
}

/// Product identifier, always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ProductId(NonZeroU32);

impl ProductId {
    /// Creates a product id, returning `None` for zero.
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the raw numeric id.
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<ProductId> for u32 {
    fn from(id: ProductId) -> Self {
        id.get()
    }
}

impl TryFrom<u32> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ProductIdError::NotPositive(0))
    }
}

impl TryFrom<i64> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(ProductIdError::NotPositive(value));
        }

        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(ProductIdError::OutOfRange(value))
    }
}

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_err| ProductIdError::NotANumber(s.to_string()))?;

        Self::try_from(value)
    }
}

/// Read-only product catalog, product id to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: BTreeMap<ProductId, String>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the catalog knows the given product.
    pub fn contains(&self, id: ProductId) -> bool {
        self.products.contains_key(&id)
    }

    /// Display name of a product, if known.
    pub fn name(&self, id: ProductId) -> Option<&str> {
        self.products.get(&id).map(String::as_str)
    }

    /// Display name of a product, or `Unknown`.
    pub fn display_name(&self, id: ProductId) -> &str {
        self.name(id).unwrap_or("Unknown")
    }

    /// Iterate products in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &str)> {
        self.products.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(ProductId, S)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (ProductId, S)>>(iter: I) -> Self {
        Self {
            products: iter
                .into_iter()
                .map(|(id, name)| (id, name.into()))
                .collect(),
        }
    }
}
