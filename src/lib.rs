// Copyright 2026 Shopfeed Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shopfeed library — unified product-listing aggregator.
//!
//! Collects product cards from three storefronts (one via static HTML
//! retrieval, two via a headless browser) and merges them into a single
//! ordered feed served over HTTP.

pub mod aggregator;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod renderer;
pub mod rest;
pub mod sources;
