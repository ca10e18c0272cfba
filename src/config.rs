//! Process configuration and the per-site collection registry.
//!
//! Target URLs and selectors are configuration data, not code: every site is
//! described by a [`SiteSpec`] and the two strategy implementations in
//! `sources/` are driven entirely by it, so adding a fourth storefront is a
//! registry entry rather than a new code path.

use crate::model::Source;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 4000;

/// Fallback search term when a request carries no `search` parameter.
pub const DEFAULT_QUERY: &str = "electronics";

/// Timeout for one static markup fetch.
pub const FETCH_TIMEOUT_MS: u64 = 15_000;

/// Timeout for one rendered-page navigation.
pub const NAV_TIMEOUT_MS: u64 = 30_000;

/// How a site's candidate records are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One GET for raw markup, parsed without rendering.
    StaticHtml,
    /// Headless-browser navigation plus a query against the live DOM.
    Rendered,
}

/// Named rules for pulling `Product` fields out of one candidate card.
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Selector for the title element, relative to the card.
    pub title: &'static str,
    /// Selector for the price element, relative to the card.
    pub price: &'static str,
    /// Lazy-load image attribute, tried first.
    pub image_lazy_attr: &'static str,
    /// Standard image attribute, the fallback.
    pub image_src_attr: &'static str,
}

/// Complete collection configuration for one site.
#[derive(Debug, Clone)]
pub struct SiteSpec {
    pub source: Source,
    pub strategy: Strategy,
    /// Catalog/search endpoint the query term is appended to.
    pub endpoint: String,
    /// Query-string parameter carrying the search term.
    pub query_param: &'static str,
    /// Top-level selector matching one product card.
    pub card_selector: &'static str,
    pub fields: FieldRules,
    /// Candidate cap applied before extraction, where the strategy bounds
    /// its harvest.
    pub limit: Option<usize>,
}

/// The configured collector registry, in fixed collection order:
/// Jumia, then Jiji, then Konga.
///
/// Output ordering of the merged feed follows this order regardless of
/// which collector's I/O settles first.
pub fn sites() -> Vec<SiteSpec> {
    vec![
        SiteSpec {
            source: Source::Jumia,
            strategy: Strategy::StaticHtml,
            endpoint: "https://www.jumia.com.ng/catalog/".to_string(),
            query_param: "q",
            card_selector: "a.core",
            fields: FieldRules {
                title: "h3.name",
                price: "div.prc",
                image_lazy_attr: "data-src",
                image_src_attr: "src",
            },
            limit: None,
        },
        SiteSpec {
            source: Source::Jiji,
            strategy: Strategy::Rendered,
            endpoint: "https://jiji.ng/search".to_string(),
            query_param: "query",
            card_selector: "a.-pVjz",
            fields: FieldRules {
                title: "div.-jGRmx",
                price: "div._7e09c",
                image_lazy_attr: "data-src",
                image_src_attr: "src",
            },
            limit: Some(12),
        },
        SiteSpec {
            source: Source::Konga,
            strategy: Strategy::Rendered,
            endpoint: "https://www.konga.com/search".to_string(),
            query_param: "search",
            card_selector: "a.product-block",
            fields: FieldRules {
                title: ".name",
                price: ".price",
                image_lazy_attr: "data-src",
                image_src_attr: "src",
            },
            limit: Some(12),
        },
    ]
}

/// Resolve the listening port: `--port` flag beats `SHOPFEED_PORT` beats
/// the default.
pub fn resolve_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| {
        std::env::var("SHOPFEED_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
    })
    .unwrap_or(DEFAULT_PORT)
}
