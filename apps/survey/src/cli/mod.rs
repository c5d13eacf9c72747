//! # Survey CLI Module
//!
//! This module implements the CLI interface.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `catalog` - List departments, tools, users and systems
//! - `check-system` - Validate a system number for a tool
//! - `responses` - Show collected responses
//! - `export` - Write collected responses to a CSV file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use survey_core::SurveyError;
use survey_core::primitives::DEFAULT_RESPONSES_FILE;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Automation Tools Survey
///
/// Collects structured feedback about internal automation tools through a
/// five-step survey and keeps the responses in a CSV file.
#[derive(Parser, Debug)]
#[command(name = "survey")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the CSV response log
    #[arg(short = 'R', long, global = true, default_value = DEFAULT_RESPONSES_FILE)]
    pub responses: PathBuf,

    /// TOML catalog replacing the built-in departments and tools
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Keep responses in memory only (server)
    #[arg(long, global = true)]
    pub memory_only: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// List the catalog
    Catalog,

    /// Check whether a system number is valid for a tool
    CheckSystem {
        /// Department name
        #[arg(short, long)]
        department: String,

        /// Tool name
        #[arg(short, long)]
        tool: String,

        /// System number to check
        system_number: String,
    },

    /// Show collected responses
    Responses {
        /// Print every row, not just the summary
        #[arg(short, long)]
        all: bool,
    },

    /// Export collected responses as CSV
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SurveyError> {
    let json_mode = cli.json_mode;
    let catalog = load_catalog(cli.catalog.as_deref())?;
    if cli.verbose {
        tracing::info!(
            departments = catalog.departments().len(),
            custom = cli.catalog.is_some(),
            "Catalog loaded"
        );
    }

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(catalog, &cli.responses, cli.memory_only, &host, port).await
        }
        Some(Commands::Catalog) => cmd_catalog(&catalog, json_mode),
        Some(Commands::CheckSystem {
            department,
            tool,
            system_number,
        }) => cmd_check_system(&catalog, json_mode, &department, &tool, &system_number),
        Some(Commands::Responses { all }) => cmd_responses(&cli.responses, json_mode, all),
        Some(Commands::Export { output }) => cmd_export(&cli.responses, &output),
        None => cmd_responses(&cli.responses, json_mode, false),
    }
}
