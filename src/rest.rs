// Copyright 2026 Shopfeed Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface: a thin axum wrapper over the aggregator.
//!
//! One endpoint does the work — `GET /api/products` runs a full aggregation
//! per request. Degraded sources are invisible at this layer; the only 500
//! is a failed rendering-session acquisition.

use crate::aggregator::Aggregator;
use crate::config;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all endpoints.
pub fn router(aggregator: Arc<Aggregator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/products", get(products))
        .layer(cors)
        .with_state(aggregator)
}

/// Start the HTTP server on the given port.
pub async fn start(port: u16, aggregator: Arc<Aggregator>) -> anyhow::Result<()> {
    let app = router(aggregator);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("serving aggregated feed on http://{addr}/api/products");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(serde::Deserialize, Default)]
struct ProductsParams {
    search: Option<String>,
}

/// `GET /api/products` — run one aggregation and serialize the result.
async fn products(
    State(aggregator): State<Arc<Aggregator>>,
    Query(params): Query<ProductsParams>,
) -> (StatusCode, Json<Value>) {
    let query = params
        .search
        .unwrap_or_else(|| config::DEFAULT_QUERY.to_string());

    match aggregator.aggregate(&query).await {
        Ok(feed) => (
            StatusCode::OK,
            Json(serde_json::to_value(&feed).unwrap_or_default()),
        ),
        Err(e) => {
            tracing::error!("aggregation failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("{e:#}") })),
            )
        }
    }
}
