//! End-to-end aggregation tests.
//!
//! The static-fetch path runs against a local wiremock server; the
//! rendered-page path runs against a fake rendering session so ordering,
//! fault isolation and session lifetime stay observable without Chromium.

use async_trait::async_trait;
use serde_json::{json, Value};
use shopfeed::aggregator::{Aggregator, BrowserProvider};
use shopfeed::config::{FieldRules, SiteSpec, Strategy};
use shopfeed::model::Source;
use shopfeed::renderer::{PageHandle, Renderer};
use shopfeed::sources;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Fake rendering session ──────────────────────────────────────

/// What a fake page does when navigated to a URL containing the key host.
#[derive(Clone)]
enum SiteBehavior {
    Records(Value),
    NavFailure,
    Slow { ms: u64, records: Value },
}

struct FakeSession {
    behaviors: HashMap<&'static str, SiteBehavior>,
    shutdowns: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
}

struct FakePage {
    behaviors: HashMap<&'static str, SiteBehavior>,
    records: Value,
    visited: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn goto(&mut self, url: &str, _timeout_ms: u64) -> anyhow::Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        let behavior = self
            .behaviors
            .iter()
            .find(|(host, _)| url.contains(*host))
            .map(|(_, b)| b.clone());
        match behavior {
            Some(SiteBehavior::Records(records)) => {
                self.records = records;
                Ok(())
            }
            Some(SiteBehavior::Slow { ms, records }) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                self.records = records;
                Ok(())
            }
            Some(SiteBehavior::NavFailure) => anyhow::bail!("net::ERR_NAME_NOT_RESOLVED"),
            None => anyhow::bail!("unexpected navigation target: {url}"),
        }
    }

    async fn evaluate(&self, _script: &str) -> anyhow::Result<Value> {
        Ok(self.records.clone())
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Renderer for FakeSession {
    async fn new_page(&self) -> anyhow::Result<Box<dyn PageHandle>> {
        Ok(Box::new(FakePage {
            behaviors: self.behaviors.clone(),
            records: json!([]),
            visited: Arc::clone(&self.visited),
        }))
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_pages(&self) -> usize {
        0
    }
}

struct FakeProvider {
    behaviors: HashMap<&'static str, SiteBehavior>,
    shutdowns: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BrowserProvider for FakeProvider {
    async fn acquire(&self) -> anyhow::Result<Box<dyn Renderer>> {
        Ok(Box::new(FakeSession {
            behaviors: self.behaviors.clone(),
            shutdowns: Arc::clone(&self.shutdowns),
            visited: Arc::clone(&self.visited),
        }))
    }
}

struct FailingProvider;

#[async_trait]
impl BrowserProvider for FailingProvider {
    async fn acquire(&self) -> anyhow::Result<Box<dyn Renderer>> {
        anyhow::bail!("rendering engine cannot start")
    }
}

// ── Test wiring ─────────────────────────────────────────────────

fn test_sites(static_endpoint: &str) -> Vec<SiteSpec> {
    let fields = FieldRules {
        title: "h3.name",
        price: "div.prc",
        image_lazy_attr: "data-src",
        image_src_attr: "src",
    };
    vec![
        SiteSpec {
            source: Source::Jumia,
            strategy: Strategy::StaticHtml,
            endpoint: static_endpoint.to_string(),
            query_param: "q",
            card_selector: "a.core",
            fields: fields.clone(),
            limit: None,
        },
        SiteSpec {
            source: Source::Jiji,
            strategy: Strategy::Rendered,
            endpoint: "https://jiji.test/search".to_string(),
            query_param: "query",
            card_selector: "a.card",
            fields: fields.clone(),
            limit: Some(12),
        },
        SiteSpec {
            source: Source::Konga,
            strategy: Strategy::Rendered,
            endpoint: "https://konga.test/search".to_string(),
            query_param: "search",
            card_selector: "a.card",
            fields,
            limit: Some(12),
        },
    ]
}

const JUMIA_CATALOG: &str = r#"
    <html><body>
      <a class="core"><img data-src="j1.jpg" src="ph.gif"/><h3 class="name">Jumia 1</h3><div class="prc">₦1</div></a>
      <a class="core"><img src="j2.jpg"/><h3 class="name">Jumia 2</h3><div class="prc">₦2</div></a>
      <a class="core"><img src="bad.jpg"/><h3 class="name">No price</h3><div class="prc"></div></a>
    </body></html>
"#;

fn rendered_records(prefix: &str, n: usize) -> Value {
    let records: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "title": format!("{prefix} {i}"),
                "price": format!("₦{i}00"),
                "image_lazy": "",
                "image_src": format!("{prefix}-{i}.jpg"),
            })
        })
        .collect();
    json!(records)
}

async fn mock_catalog(delay_ms: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(JUMIA_CATALOG)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(&server)
        .await;
    server
}

fn aggregator_with(
    static_endpoint: &str,
    behaviors: HashMap<&'static str, SiteBehavior>,
    shutdowns: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
) -> Aggregator {
    Aggregator::new(
        Box::new(FakeProvider {
            behaviors,
            shutdowns,
            visited,
        }),
        sources::build(test_sites(static_endpoint)),
    )
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn merged_feed_preserves_source_order_even_with_a_slow_first_source() {
    // Static source delayed 100ms; rendered sources answer immediately.
    let server = mock_catalog(100).await;
    let behaviors = HashMap::from([
        ("jiji.test", SiteBehavior::Records(rendered_records("Jiji", 2))),
        ("konga.test", SiteBehavior::Records(rendered_records("Konga", 1))),
    ]);
    let agg = aggregator_with(
        &format!("{}/catalog/", server.uri()),
        behaviors,
        Arc::new(AtomicUsize::new(0)),
        Arc::new(Mutex::new(Vec::new())),
    );

    let result = agg.aggregate("tv").await.unwrap();

    let titles: Vec<&str> = result.products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Jumia 1", "Jumia 2", "Jiji 1", "Jiji 2", "Konga 1"]
    );
    assert_eq!(result.total, result.products.len());

    // The no-price card was filtered, the lazy-load attribute won.
    assert_eq!(result.total, 5);
    assert_eq!(result.products[0].image, "j1.jpg");

    // Field invariant: nothing empty gets through.
    for p in &result.products {
        assert!(!p.title.is_empty());
        assert!(!p.price.is_empty());
        assert!(!p.image.is_empty());
        assert_eq!(p.description, p.title);
    }
}

#[tokio::test]
async fn failing_source_is_isolated_and_session_still_released_once() {
    let server = mock_catalog(0).await;
    let behaviors = HashMap::from([
        ("jiji.test", SiteBehavior::NavFailure),
        ("konga.test", SiteBehavior::Records(rendered_records("Konga", 2))),
    ]);
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let agg = aggregator_with(
        &format!("{}/catalog/", server.uri()),
        behaviors,
        Arc::clone(&shutdowns),
        Arc::new(Mutex::new(Vec::new())),
    );

    let result = agg.aggregate("tv").await.unwrap();

    let sources_seen: Vec<Source> = result.products.iter().map(|p| p.source).collect();
    assert_eq!(
        sources_seen,
        vec![Source::Jumia, Source::Jumia, Source::Konga, Source::Konga]
    );
    assert_eq!(result.total, 4);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_query_is_forwarded_to_every_strategy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/"))
        .and(query_param("q", "smart tv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(JUMIA_CATALOG))
        .expect(1)
        .mount(&server)
        .await;

    let behaviors = HashMap::from([
        ("jiji.test", SiteBehavior::Records(json!([]))),
        ("konga.test", SiteBehavior::Records(json!([]))),
    ]);
    let visited = Arc::new(Mutex::new(Vec::new()));
    let agg = aggregator_with(
        &format!("{}/catalog/", server.uri()),
        behaviors,
        Arc::new(AtomicUsize::new(0)),
        Arc::clone(&visited),
    );

    agg.aggregate("smart tv").await.unwrap();

    let visited = visited.lock().unwrap();
    assert!(visited
        .iter()
        .any(|u| u.contains("jiji.test") && u.contains("query=smart+tv")));
    assert!(visited
        .iter()
        .any(|u| u.contains("konga.test") && u.contains("search=smart+tv")));
}

#[tokio::test]
async fn a_slow_source_is_never_raced_out() {
    let server = mock_catalog(0).await;
    let behaviors = HashMap::from([
        (
            "jiji.test",
            SiteBehavior::Slow {
                ms: 120,
                records: rendered_records("Jiji", 1),
            },
        ),
        ("konga.test", SiteBehavior::Records(rendered_records("Konga", 1))),
    ]);
    let agg = aggregator_with(
        &format!("{}/catalog/", server.uri()),
        behaviors,
        Arc::new(AtomicUsize::new(0)),
        Arc::new(Mutex::new(Vec::new())),
    );

    let result = agg.aggregate("tv").await.unwrap();

    // The slow source completes and still lands between its neighbors.
    let sources_seen: Vec<Source> = result.products.iter().map(|p| p.source).collect();
    assert_eq!(
        sources_seen,
        vec![Source::Jumia, Source::Jumia, Source::Jiji, Source::Konga]
    );
}

// ── REST surface ────────────────────────────────────────────────

async fn serve(aggregator: Aggregator) -> String {
    let app = shopfeed::rest::router(Arc::new(aggregator));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn products_endpoint_returns_the_merged_feed() {
    let server = mock_catalog(0).await;
    let behaviors = HashMap::from([
        ("jiji.test", SiteBehavior::Records(rendered_records("Jiji", 1))),
        ("konga.test", SiteBehavior::NavFailure),
    ]);
    let agg = aggregator_with(
        &format!("{}/catalog/", server.uri()),
        behaviors,
        Arc::new(AtomicUsize::new(0)),
        Arc::new(Mutex::new(Vec::new())),
    );

    let base = serve(agg).await;
    let resp = reqwest::get(format!("{base}/api/products?search=tv"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let products = body["products"].as_array().unwrap();
    assert_eq!(body["total"].as_u64().unwrap() as usize, products.len());
    assert_eq!(products.len(), 3);
    assert_eq!(products[0]["source"], "jumia");
    assert_eq!(products[2]["source"], "jiji");
}

#[tokio::test]
async fn session_acquisition_failure_surfaces_as_500() {
    let agg = Aggregator::new(
        Box::new(FailingProvider),
        sources::build(test_sites("https://jumia.test/catalog/")),
    );

    let base = serve(agg).await;
    let resp = reqwest::get(format!("{base}/api/products")).await.unwrap();
    assert_eq!(resp.status(), 500);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("rendering session"));
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let agg = Aggregator::new(
        Box::new(FailingProvider),
        sources::build(test_sites("https://jumia.test/catalog/")),
    );

    let base = serve(agg).await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}
