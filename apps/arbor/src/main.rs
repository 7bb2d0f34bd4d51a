//! # Arbor - Versioned Topic Tree Server
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │               apps/arbor (THE BINARY)             │
//! │                                                   │
//! │   ┌─────────────┐  ┌─────────────┐  ┌──────────┐  │
//! │   │    CLI      │  │  HTTP API   │  │  Config  │  │
//! │   │   (clap)    │  │   (axum)    │  │  (toml)  │  │
//! │   └──────┬──────┘  └──────┬──────┘  └────┬─────┘  │
//! │          └────────────────┼──────────────┘        │
//! │                           ▼                       │
//! │                   ┌──────────────┐                │
//! │                   │  arbor-core  │                │
//! │                   │ (THE STORE)  │                │
//! │                   └──────────────┘                │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server with a seed forest
//! arbor server --host 0.0.0.0 --port 8080 --seed topics.json
//!
//! # Inspect a seed document
//! arbor status --seed topics.json
//! arbor tree --seed topics.json --version 2
//! ```

use arbor::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ARBOR_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ARBOR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "arbor=info,arbor_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(code = e.code(), "Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Arbor startup banner.
fn print_banner() {
    println!(
        r#"
     _         _
    / \   _ __| |__   ___  _ __
   / _ \ | '__| '_ \ / _ \| '__|
  / ___ \| |  | |_) | (_) | |
 /_/   \_\_|  |_.__/ \___/|_|

  Versioned Topic Trees v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
