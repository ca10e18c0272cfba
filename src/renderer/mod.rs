//! Renderer abstraction for browser-based collection.
//!
//! [`Renderer`] is one live browser session; [`PageHandle`] is one tab
//! opened from it. The aggregator owns the session for the duration of a
//! request and each rendered-page collector opens its own tab from the
//! shared handle, so no locking is needed across collectors.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A browser session that can open page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new page (tab) in this session.
    async fn new_page(&self) -> Result<Box<dyn PageHandle>>;
    /// Shut the session down. Called exactly once, after all pages opened
    /// from it are closed.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently open pages.
    fn open_pages(&self) -> usize;
}

/// A single page (tab) for rendering and querying one site.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigate to a URL and wait for the page to settle, bounded by a
    /// timeout in milliseconds.
    async fn goto(&mut self, url: &str, timeout_ms: u64) -> Result<()>;
    /// Evaluate JavaScript in the page and return its JSON result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
    /// Close this page.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A renderer that refuses to open pages.
///
/// Used where a test exercises only the static-fetch path but the
/// aggregation contract still requires a session handle.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
        Err(anyhow::anyhow!("no browser available"))
    }
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
    fn open_pages(&self) -> usize {
        0
    }
}
