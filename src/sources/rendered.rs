//! Rendered-page strategy: navigate a shared browser session and query the
//! live DOM.
//!
//! The DOM query runs inside the page as injected JavaScript built from the
//! site's configured selectors, so one strategy body serves every rendered
//! site. The page is closed on every path, including failure.

use super::{search_url, CollectContext, Collector};
use crate::config::{SiteSpec, NAV_TIMEOUT_MS};
use crate::extract::{normalize, RawRecord};
use crate::model::{Product, Source};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Collects by rendering the site in a browser tab and harvesting cards
/// from the live DOM.
pub struct RenderedCollector {
    site: SiteSpec,
}

impl RenderedCollector {
    pub fn new(site: SiteSpec) -> Self {
        Self { site }
    }

    async fn try_collect(&self, cx: &CollectContext<'_>) -> Result<Vec<Product>> {
        let url = search_url(&self.site.endpoint, self.site.query_param, cx.query)?;
        let mut page = cx.renderer.new_page().await?;

        // The page must be released even when navigation or the DOM query
        // fails, so harvesting happens before the close and its outcome is
        // carried past it.
        let outcome = harvest(page.as_mut(), &url, &self.site).await;
        if let Err(e) = page.close().await {
            warn!(source = %self.site.source, "failed to close page: {e:#}");
        }

        let products = outcome?;
        debug!(source = %self.site.source, count = products.len(), "rendered collection finished");
        Ok(products)
    }
}

#[async_trait]
impl Collector for RenderedCollector {
    fn source(&self) -> Source {
        self.site.source
    }

    async fn collect(&self, cx: &CollectContext<'_>) -> Vec<Product> {
        match self.try_collect(cx).await {
            Ok(products) => products,
            Err(e) => {
                warn!(source = %self.site.source, "collection failed: {e:#}");
                Vec::new()
            }
        }
    }
}

async fn harvest(
    page: &mut dyn crate::renderer::PageHandle,
    url: &str,
    site: &SiteSpec,
) -> Result<Vec<Product>> {
    page.goto(url, NAV_TIMEOUT_MS).await?;

    let value = page.evaluate(&card_query(site)).await?;
    let records: Vec<RawRecord> =
        serde_json::from_value(value).context("DOM query returned an unexpected shape")?;

    Ok(records
        .iter()
        .filter_map(|r| normalize(r, site.source))
        .collect())
}

/// Build the in-page DOM query for this site's selectors.
///
/// Mirrors the shared extractor's record shape: missing sub-elements surface
/// as empty strings, and both image attributes are captured so the lazy-load
/// fallback stays in one place ([`crate::extract::normalize`]).
fn card_query(site: &SiteSpec) -> String {
    let slice = site
        .limit
        .map(|n| format!(".slice(0, {n})"))
        .unwrap_or_default();

    format!(
        "Array.from(document.querySelectorAll({card})){slice}.map(el => ({{\
            title: el.querySelector({title})?.innerText || '',\
            price: el.querySelector({price})?.innerText || '',\
            image_lazy: el.querySelector('img')?.getAttribute({lazy}) || '',\
            image_src: el.querySelector('img')?.getAttribute({src}) || '',\
        }}))",
        card = js_string(site.card_selector),
        title = js_string(site.fields.title),
        price = js_string(site.fields.price),
        lazy = js_string(site.fields.image_lazy_attr),
        src = js_string(site.fields.image_src_attr),
    )
}

/// Quote a selector as a JS string literal. JSON string encoding is valid
/// JS and handles embedded quotes.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_default()
}
