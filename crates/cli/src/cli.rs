//! Command-line arguments.

use clap::{Parser, Subcommand};
use splice_client::InsertMode;
use splice_core::{AppConfig, ConfigError};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "splice", version, about = "Render extension fragments and call JSON APIs")]
pub struct Cli {
    /// Extension root directory or http(s) base URL.
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// SQLite file for the session cache.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Preferred language (e.g. fr-CA).
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Directory of <code>.json locale files.
    #[arg(long, global = true)]
    pub locales: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a page and print the root element's HTML.
    Page { name: String },

    /// Load a template and print the target element's HTML.
    Template {
        path: String,

        /// append, prepend or innerHTML.
        #[arg(long, default_value = "append")]
        mode: InsertMode,

        /// Placeholder replacement, KEY=VALUE. Repeatable.
        #[arg(long = "set", value_parser = parse_pair)]
        replacements: Vec<(String, String)>,
    },

    /// Issue a cached GET and print its data payload.
    Get {
        base_url: String,

        #[arg(default_value = "")]
        endpoint: String,

        /// Request header, NAME=VALUE. Repeatable.
        #[arg(short = 'H', long = "header", value_parser = parse_pair)]
        headers: Vec<(String, String)>,

        /// Bypass the response cache.
        #[arg(long)]
        reload: bool,
    },

    /// Empty the persistent session cache (requires --store).
    ClearCache,
}

impl Cli {
    /// Layered configuration with command-line flags applied on top.
    pub fn config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::load()?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut AppConfig) {
        if let Some(root) = &self.root {
            config.resource_root = root.clone();
        }
        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
        if let Some(lang) = &self.lang {
            config.language = Some(lang.clone());
        }
        if let Some(locales) = &self.locales {
            config.locales_dir = Some(locales.clone());
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}
