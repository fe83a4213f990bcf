//! aiservice CLI

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
pub use {
    generate::{GenerateCmd, MODELS_FILE, Summary},
    inspect::InspectCmd,
    manifest::Manifest,
};

mod generate;
mod inspect;
mod manifest;

/// aiservice CLI
#[derive(Debug, Parser)]
#[command(name = "aiservice", version, about)]
pub struct App {
    /// Path of the manifest
    #[arg(short, long, global = true, default_value = manifest::MANIFEST_FILE)]
    pub manifest: std::path::PathBuf,

    /// Verbosity level (use -v, -vv, -vvv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the service implementations of a source tree
    Generate(generate::GenerateCmd),

    /// List the services of a source tree and their methods
    Inspect(inspect::InspectCmd),

    /// Write a manifest with the default configuration
    Init,
}

impl App {
    /// Initialize tracing subscriber based on verbosity
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directive = match self.verbose {
                0 => "info",
                1 => "aiservice_codegen=debug,aiservice_provider=debug",
                2 => "aiservice_codegen=trace,aiservice_provider=trace",
                3 => "debug",
                _ => "trace",
            };
            EnvFilter::new(directive)
        });

        fmt()
            .without_time()
            .with_env_filter(filter)
            .with_target(self.verbose != 0)
            .init();
    }
}
