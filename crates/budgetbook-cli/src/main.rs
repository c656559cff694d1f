//! BudgetBook CLI - Household budget backend
//!
//! Usage:
//!   budgetbook init                         Initialize database
//!   budgetbook serve --port 3000            Start web server
//!   budgetbook orgs add "Red Cross"         Add a gift recipient
//!   budgetbook statement summarize FILE     Category totals of a statement
//!   budgetbook budget show --user 1         Print a saved budget

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            uploads_dir,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                &uploads_dir,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Orgs { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(OrgsAction::List) => commands::cmd_orgs_list(&db),
                Some(OrgsAction::Add { name, abn }) => commands::cmd_orgs_add(&db, &name, abn),
            }
        }
        Commands::Statement { action } => match action {
            StatementAction::Summarize {
                file,
                transform,
                json,
            } => commands::cmd_statement_summarize(&file, transform, json),
            StatementAction::Raw { file, limit } => commands::cmd_statement_raw(&file, limit),
        },
        Commands::Budget { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                BudgetAction::Show { user, json } => commands::cmd_budget_show(&db, user, json),
            }
        }
    }
}
