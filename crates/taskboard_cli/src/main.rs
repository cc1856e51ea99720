//! `taskboard` command-line front end.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the session cache.
//! - Translate subcommands into core service calls and print results.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use log::error;
use taskboard_core::{init_logging, open_cache, AppConfig, ConfigOverrides, SqliteSessionCache};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        store_url: cli.store_url.clone(),
        cache_path: cli.cache_path.clone(),
        log_level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
    };
    let config = AppConfig::load(cli.config.as_deref(), overrides)?;

    let log_dir = match config.log_dir.as_deref() {
        Some(dir) => Some(
            dir.to_str()
                .ok_or_else(|| format!("log directory `{}` is not UTF-8", dir.display()))?,
        ),
        None => None,
    };
    init_logging(&config.log_level, log_dir)?;

    let conn = open_cache(&config.cache_path)?;
    let cache = SqliteSessionCache::new(&conn);
    let result = commands::run(cli.command, &config, &cache);
    if result.is_err() {
        error!("event=cli_command module=cli status=error");
    }
    result
}
