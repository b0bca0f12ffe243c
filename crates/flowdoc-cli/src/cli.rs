use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flowdoc_core::models::document::{DEFAULT_LIMIT, DEFAULT_PAGE};

/// Page size used to compute dashboard statistics
const DEFAULT_STATS_LIMIT: u32 = 100;

#[derive(Debug, Parser)]
#[command(name = "flowdoc", version, about = "Flowdoc document management from the terminal")]
pub struct Cli {
    /// Backend URL (overrides config and FLOWDOC_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Remove the stored session token
    Logout,
    /// Show whether a session token is stored
    Status,
    /// Upload a PDF or image
    Upload { path: PathBuf },
    /// List documents
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        /// Print the backend payload instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a document's details
    Show { id: String },
    /// Share a document
    Share {
        id: String,
        /// Sharing configuration as JSON, forwarded unchanged
        #[arg(long)]
        config: String,
    },
    /// Statistics and recent documents
    Dashboard {
        /// Number of recent documents to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
        /// Number of documents the statistics are computed over
        #[arg(long, default_value_t = DEFAULT_STATS_LIMIT)]
        stats_limit: u32,
    },
}
