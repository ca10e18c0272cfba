//! The aggregation core: run every collector concurrently against one
//! shared rendering session and merge their outputs in fixed source order.

use crate::config;
use crate::fetch::HttpClient;
use crate::model::AggregateResult;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use crate::sources::{self, CollectContext, Collector};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// Acquires one rendering session per aggregation run.
///
/// Chromium in production; tests substitute a fake so session lifetime and
/// ownership stay observable.
#[async_trait]
pub trait BrowserProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Renderer>>;
}

/// Launches a fresh headless Chromium for each request.
pub struct ChromiumProvider;

#[async_trait]
impl BrowserProvider for ChromiumProvider {
    async fn acquire(&self) -> Result<Box<dyn Renderer>> {
        Ok(Box::new(ChromiumRenderer::launch().await?))
    }
}

/// Runs all configured collectors and merges their outputs.
pub struct Aggregator {
    provider: Box<dyn BrowserProvider>,
    collectors: Vec<Box<dyn Collector>>,
    http: HttpClient,
}

impl Aggregator {
    pub fn new(provider: Box<dyn BrowserProvider>, collectors: Vec<Box<dyn Collector>>) -> Self {
        Self {
            provider,
            collectors,
            http: HttpClient::new(config::FETCH_TIMEOUT_MS),
        }
    }

    /// Production wiring: Chromium sessions and the configured site registry.
    pub fn with_default_sites() -> Self {
        Self::new(Box::new(ChromiumProvider), sources::build(config::sites()))
    }

    /// Run one aggregation for the given search term.
    ///
    /// Session acquisition failure is the only error that escapes; every
    /// per-collector fault has already been collapsed to an empty sequence
    /// inside the collector boundary.
    pub async fn aggregate(&self, query: &str) -> Result<AggregateResult> {
        let renderer = self
            .provider
            .acquire()
            .await
            .context("failed to acquire rendering session")?;

        // All-complete join: join_all preserves input order and waits for
        // every collector, so a slow source is never raced out and the
        // merged order stays deterministic.
        let outputs = {
            let cx = CollectContext {
                renderer: renderer.as_ref(),
                http: &self.http,
                query,
            };
            let runs = self.collectors.iter().map(|c| c.collect(&cx));
            futures::future::join_all(runs).await
        };

        // The session is released exactly once, after every collector
        // using it has finished.
        if let Err(e) = renderer.shutdown().await {
            warn!("failed to shut down rendering session: {e:#}");
        }

        let products: Vec<_> = outputs.into_iter().flatten().collect();
        info!(query, total = products.len(), "aggregation finished");
        Ok(AggregateResult::from_products(products))
    }
}
