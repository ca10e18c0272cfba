//! Source collectors: one strategy instance per configured site.
//!
//! Collectors are infallible at their boundary. Any internal failure
//! (network, navigation, parsing, selector mismatch) is logged and collapsed
//! to an empty sequence, so a broken source can never fail the aggregation
//! or starve its peers.

pub mod rendered;
pub mod static_html;

use crate::config::{SiteSpec, Strategy};
use crate::fetch::HttpClient;
use crate::model::{Product, Source};
use crate::renderer::Renderer;
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Shared resources handed to every collector for one aggregation run.
pub struct CollectContext<'a> {
    /// Live rendering session, shared read-only across collectors.
    pub renderer: &'a dyn Renderer,
    /// HTTP client for static-fetch strategies.
    pub http: &'a HttpClient,
    /// Search term, forwarded to every strategy.
    pub query: &'a str,
}

/// One site-specific strategy for obtaining and normalizing candidates.
#[async_trait]
pub trait Collector: Send + Sync {
    fn source(&self) -> Source;
    /// Collect a bounded list of normalized products. Never fails; a
    /// degraded source yields an empty sequence.
    async fn collect(&self, cx: &CollectContext<'_>) -> Vec<Product>;
}

/// Build the collector set from site configuration, preserving order.
pub fn build(sites: Vec<SiteSpec>) -> Vec<Box<dyn Collector>> {
    sites
        .into_iter()
        .map(|site| match site.strategy {
            Strategy::StaticHtml => {
                Box::new(static_html::StaticCollector::new(site)) as Box<dyn Collector>
            }
            Strategy::Rendered => Box::new(rendered::RenderedCollector::new(site)),
        })
        .collect()
}

/// Build the site's search URL with the query term percent-encoded.
pub(crate) fn search_url(endpoint: &str, param: &str, query: &str) -> Result<String> {
    let mut url = url::Url::parse(endpoint)
        .with_context(|| format!("invalid site endpoint: {endpoint}"))?;
    url.query_pairs_mut().append_pair(param, query);
    Ok(url.to_string())
}
