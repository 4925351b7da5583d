//! splice command-line entry point.
//!
//! Renders pages and templates from an extension directory (or served root)
//! into an in-memory document and prints the result, or issues requests
//! through the cached request helper.
//! `clear-cache` empties a persistent session store. Logging goes to stderr so rendered
//! output on stdout stays clean.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.config()?;
    tracing::debug!(resource_root = %config.resource_root, "configuration loaded");

    let output = match cli.command {
        Command::Page { name } => commands::render_page(&config, &name).await?,
        Command::Template { path, mode, replacements } => {
            commands::render_template(&config, &path, mode, replacements).await?
        }
        Command::Get { base_url, endpoint, headers, reload } => {
            commands::get(&config, &base_url, &endpoint, headers, reload).await?
        }
        Command::ClearCache => commands::clear_cache(&config).await?,
    };

    println!("{output}");
    Ok(())
}
