//! Command-line interface for the keyword service.
//!
//! `serve` is the default; the other commands work directly against the
//! configured database.

mod commands;

use clap::{Parser, Subcommand};

use crate::services::ExportFormat;

/// Facility keyword suggestion service
#[derive(Parser)]
#[command(name = "keyword-suggest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "web")]
    Serve,

    /// Create a default config file
    #[command(alias = "--init")]
    Init,

    /// List registered facilities
    #[command(alias = "ls")]
    Facilities {
        /// Case-insensitive match on name or address
        #[arg(long)]
        search: Option<String>,
        /// Exact business type
        #[arg(long)]
        business_type: Option<String>,
        /// Maximum rows to show
        #[arg(long, default_value = "50")]
        limit: u64,
    },

    /// Generate keywords for a facility and print them as JSON
    Generate {
        /// Facility ID
        id: String,
        /// Persist the generated keywords
        #[arg(long)]
        save: bool,
    },

    /// Export a facility's keywords to stdout
    Export {
        /// Facility ID
        id: String,
        /// Output format: csv or json
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },
}

pub use commands::*;
