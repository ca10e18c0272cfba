//! Core value types of the aggregated feed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront a product was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Jumia,
    Jiji,
    Konga,
}

impl Source {
    /// Stable lowercase identifier, as emitted in the JSON feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Jumia => "jumia",
            Source::Jiji => "jiji",
            Source::Konga => "konga",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized product listing.
///
/// Constructed only by [`crate::extract::normalize`], which guarantees that
/// `title`, `price` and `image` are non-empty. `price` stays in site-native
/// formatting; no numeric normalization is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: String,
    pub image: String,
    pub description: String,
    pub source: Source,
}

/// The merged output of one aggregation run.
///
/// `total` always equals `products.len()`; products appear grouped by
/// collector in the fixed configured source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total: usize,
    pub products: Vec<Product>,
}

impl AggregateResult {
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            total: products.len(),
            products,
        }
    }
}
