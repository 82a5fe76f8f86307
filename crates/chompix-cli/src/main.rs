//! Chompix CLI - a food diary that works offline.
//!
//! Entries land in the local store immediately; `chompix sync` reconciles
//! with the configured server when connectivity allows.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{CacheCommands, Cli, Commands};
use crate::commands::{add, cache_cmd, common, completions, delete, export, list, sync_cmd};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chompix=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = common::resolve_db_path(cli.db_path);

    match cli.command {
        Some(Commands::Add {
            text,
            photo,
            at,
            event_at,
        }) => {
            add::run_add(
                &text,
                photo.as_deref(),
                at.as_deref(),
                event_at.as_deref(),
                &db_path,
            )
            .await?;
        }
        Some(Commands::List {
            limit,
            unsynced,
            json,
        }) => {
            list::run_list(limit, unsynced, json, &db_path).await?;
        }
        Some(Commands::Delete { id }) => delete::run_delete(&id, &db_path).await?,
        Some(Commands::Sync) => sync_cmd::run_sync(&db_path).await?,
        Some(Commands::Cache { command }) => match command {
            CacheCommands::Warm => cache_cmd::run_cache_warm(&db_path).await?,
            CacheCommands::Fetch { url } => cache_cmd::run_cache_fetch(&url, &db_path).await?,
        },
        Some(Commands::Export { format, output }) => {
            export::run_export(format, output.as_deref(), &db_path).await?;
        }
        Some(Commands::Completions { shell, output }) => {
            completions::run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick capture mode: chompix "ate two eggs"
            if cli.entry.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                add::run_add(&cli.entry, None, None, None, &db_path).await?;
            }
        }
    }

    Ok(())
}
