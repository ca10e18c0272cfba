// Copyright 2026 Shopfeed Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use shopfeed::aggregator::Aggregator;
use shopfeed::{config, rest};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "shopfeed",
    about = "Unified product-listing aggregator",
    version
)]
struct Cli {
    /// Listening port (SHOPFEED_PORT is also honored)
    #[arg(long)]
    port: Option<u16>,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "shopfeed=debug"
    } else {
        "shopfeed=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .init();

    let port = config::resolve_port(cli.port);
    info!("starting shopfeed v{}", env!("CARGO_PKG_VERSION"));

    let aggregator = Arc::new(Aggregator::with_default_sites());
    rest::start(port, aggregator).await
}
