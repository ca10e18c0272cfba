//! Async HTTP client for the static-fetch strategy.
//!
//! Not a browser — one GET per collection run, with a desktop user-agent
//! and an explicit timeout. Caching, retry and rate limiting are out of
//! scope.

use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Desktop Chrome user-agent. Some storefronts serve bot-interstitial pages
/// to the default reqwest UA.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// HTTP client shared by all static-fetch collectors.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET a URL and return the body text. Non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }

        resp.text().await.context("failed to read response body")
    }
}
