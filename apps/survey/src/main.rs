//! # Automation Tools Survey
//!
//! The main binary for the survey server.
//!
//! This application provides:
//! - HTTP JSON API that walks respondents through the survey wizard
//! - Admin endpoints to review and export collected responses
//! - CLI interface for catalog inspection and offline export
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/survey (THE BINARY)              │
//! │                                                      │
//! │   ┌─────────────┐              ┌─────────────┐       │
//! │   │    CLI      │              │  HTTP API   │       │
//! │   │   (clap)    │              │   (axum)    │       │
//! │   └──────┬──────┘              └──────┬──────┘       │
//! │          └──────────────┬─────────────┘              │
//! │                         ▼                            │
//! │                 ┌───────────────┐                    │
//! │                 │  survey-core  │                    │
//! │                 │  (THE LOGIC)  │                    │
//! │                 └───────────────┘                    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! SURVEY_ADMIN_PASSWORD=... survey server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! survey catalog
//! survey check-system -d Finance -t "SMS & Tally Fnf Reco" RVS120A
//! survey export -o responses.csv
//! ```

use clap::Parser;
use survey::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // SURVEY_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("SURVEY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "survey=info,tower_http=debug".into());

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

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  Automation Tools Survey v{}

  Department → Tool → User → System → Questions
"#,
        env!("CARGO_PKG_VERSION")
    );
}
