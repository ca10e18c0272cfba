//! Shared field-extraction contract.
//!
//! Both collection strategies reduce a candidate card to a [`RawRecord`] of
//! untrimmed field values; [`normalize`] then applies the one filtering rule
//! of the system: a product exists only when title, price and image are all
//! non-empty. Everything upstream of this point is site-specific selector
//! configuration.

use crate::model::{Product, Source};
use serde::Deserialize;

/// Raw, not-yet-validated field values pulled from one candidate card.
///
/// Access failures upstream (missing sub-element, absent attribute) are
/// represented as empty strings, never as errors — a malformed card is an
/// expected, high-frequency input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    /// Value of the lazy-load image attribute, tried first.
    #[serde(default)]
    pub image_lazy: String,
    /// Value of the standard image attribute, the fallback.
    #[serde(default)]
    pub image_src: String,
}

/// Normalize one candidate into a [`Product`], or drop it.
///
/// Returns `None` when any required field is empty after trimming. This is
/// a filtering rule, not an error: the caller moves on to the next card.
/// The description is derived from the title, matching what all three
/// storefronts expose.
pub fn normalize(raw: &RawRecord, source: Source) -> Option<Product> {
    let title = raw.title.trim();
    let price = raw.price.trim();
    let image = first_non_empty(&raw.image_lazy, &raw.image_src);

    if title.is_empty() || price.is_empty() || image.is_empty() {
        return None;
    }

    Some(Product {
        title: title.to_string(),
        price: price.to_string(),
        image: image.to_string(),
        description: title.to_string(),
        source,
    })
}

fn first_non_empty<'a>(lazy: &'a str, src: &'a str) -> &'a str {
    let lazy = lazy.trim();
    if !lazy.is_empty() {
        lazy
    } else {
        src.trim()
    }
}
