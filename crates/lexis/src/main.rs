// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexis - background coordinator for a vocabulary-learning browser extension.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexis_config::{ConfigError, LexisConfig};

/// Lexis - background coordinator for a vocabulary-learning browser extension.
#[derive(Parser, Debug)]
#[command(name = "lexis", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the WebSocket gateway and message router.
    Serve,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Validate configuration and report every problem found.
    Check,
    /// Print the effective configuration with secrets redacted.
    Show,
}

fn load(path: Option<&PathBuf>) -> Result<LexisConfig, Vec<ConfigError>> {
    match path {
        Some(path) => lexis_config::load_and_validate_path(path),
        None => lexis_config::load_and_validate(),
    }
}

fn load_or_exit(path: Option<&PathBuf>) -> LexisConfig {
    match load(path) {
        Ok(config) => config,
        Err(errors) => {
            lexis_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn render_redacted(config: &LexisConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&config.redacted())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let config = load_or_exit(cli.config.as_ref());
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => {
            let config = load_or_exit(cli.config.as_ref());
            match action {
                ConfigAction::Check => println!("lexis: configuration is valid"),
                ConfigAction::Show => match render_redacted(&config) {
                    Ok(text) => print!("{text}"),
                    Err(e) => {
                        eprintln!("error: failed to render configuration: {e}");
                        std::process::exit(1);
                    }
                },
            }
        }
        None => {
            println!("lexis: use --help for available commands");
        }
    }
}
