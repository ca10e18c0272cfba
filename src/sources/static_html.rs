//! Static-fetch strategy: one GET plus markup parsing, no rendering.

use super::{search_url, CollectContext, Collector};
use crate::config::SiteSpec;
use crate::extract::{normalize, RawRecord};
use crate::model::{Product, Source};
use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Collects by fetching raw markup and walking it with CSS selectors.
pub struct StaticCollector {
    site: SiteSpec,
}

impl StaticCollector {
    pub fn new(site: SiteSpec) -> Self {
        Self { site }
    }

    async fn try_collect(&self, cx: &CollectContext<'_>) -> Result<Vec<Product>> {
        let url = search_url(&self.site.endpoint, self.site.query_param, cx.query)?;
        let html = cx.http.get_text(&url).await?;

        // scraper types are !Send; parsing stays in a sync helper so this
        // future never holds them across an await.
        let products = parse_cards(&html, &self.site);
        debug!(source = %self.site.source, count = products.len(), "static collection finished");
        Ok(products)
    }
}

#[async_trait]
impl Collector for StaticCollector {
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

/// Locate every card node and reduce it through the shared extractor.
///
/// An unparseable card selector yields no candidates, which the collector
/// boundary reports as a degraded-empty source.
fn parse_cards(html: &str, site: &SiteSpec) -> Vec<Product> {
    let Ok(card) = Selector::parse(site.card_selector) else {
        warn!(source = %site.source, selector = site.card_selector, "invalid card selector");
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    doc.select(&card)
        .take(site.limit.unwrap_or(usize::MAX))
        .filter_map(|el| normalize(&read_card(el, site), site.source))
        .collect()
}

/// Pull raw field values out of one card. Missing sub-elements and absent
/// attributes become empty strings, never errors.
fn read_card(card: ElementRef<'_>, site: &SiteSpec) -> RawRecord {
    let (image_lazy, image_src) = Selector::parse("img")
        .ok()
        .and_then(|sel| card.select(&sel).next())
        .map(|img| {
            (
                img.value()
                    .attr(site.fields.image_lazy_attr)
                    .unwrap_or_default()
                    .to_string(),
                img.value()
                    .attr(site.fields.image_src_attr)
                    .unwrap_or_default()
                    .to_string(),
            )
        })
        .unwrap_or_default();

    RawRecord {
        title: select_text(card, site.fields.title),
        price: select_text(card, site.fields.price),
        image_lazy,
        image_src,
    }
}

fn select_text(card: ElementRef<'_>, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| card.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
}
