//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BudgetBook - Household budget worksheet and giving tracker
#[derive(Parser)]
#[command(name = "budgetbook")]
#[command(about = "Self-hosted household budget backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "budgetbook.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set BUDGETBOOK_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory for uploaded receipts (served under /uploads)
        #[arg(long, default_value = "uploads")]
        uploads_dir: PathBuf,

        /// Directory with the built client to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage gift recipient organisations
    Orgs {
        #[command(subcommand)]
        action: Option<OrgsAction>,
    },

    /// Summarize bank statement CSV files
    Statement {
        #[command(subcommand)]
        action: StatementAction,
    },

    /// Inspect saved budgets
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },
}

#[derive(Subcommand)]
pub enum OrgsAction {
    /// List organisations (default)
    List,

    /// Add an organisation
    Add {
        /// Entity name
        name: String,

        /// Australian Business Number
        #[arg(long)]
        abn: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum StatementAction {
    /// Per-category income and expenditure totals
    Summarize {
        /// Statement CSV (Date, Amount, Name, Balance, Category)
        file: PathBuf,

        /// Show one row per category with absolute amounts
        #[arg(long)]
        transform: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print any CSV as generic rows
    Raw {
        /// CSV file
        file: PathBuf,

        /// Maximum rows to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Show a user's saved budget
    Show {
        /// User id
        #[arg(short, long)]
        user: i64,

        /// Print the full budget tree as JSON
        #[arg(long)]
        json: bool,
    },
}
