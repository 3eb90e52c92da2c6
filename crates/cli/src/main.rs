//! graphschema CLI - Neo4j schema inference
//!
//! Infers the property-graph schema of a Neo4j database, confirms every
//! element against live data and exports it as JSON.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graphschema::{
    cancel_on_interrupt, check, generate, log_directives, GenerateOptions,
};
use graphschema_core::Config;
use graphschema_storage::create_graph_session;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "graphschema")]
#[command(about = "Infer and validate the schema of a Neo4j graph database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the validated schema document
    Generate {
        /// Output file (defaults to output.path from configuration)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum concurrent probe queries
        #[arg(short, long)]
        workers: Option<usize>,

        /// Cancel generation after this many seconds
        #[arg(long, value_name = "SECS")]
        deadline_secs: Option<u64>,

        /// Pretty-print the JSON document
        #[arg(long)]
        pretty: bool,

        /// Where to write the labeled partial document if an aspect fails
        #[arg(long, value_name = "FILE")]
        partial_output: Option<PathBuf>,
    },
    /// Check connectivity to Neo4j
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Generate {
            output,
            workers,
            deadline_secs,
            pretty,
            partial_output,
        } => {
            let options = GenerateOptions {
                output,
                workers,
                deadline_secs,
                pretty,
                partial_output,
            };
            run_generate(cli.config.as_deref(), &options).await
        }
        Commands::Check => run_check(cli.config.as_deref()).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let rust_log = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok();
    let directives = log_directives(verbose, rust_log.as_deref());
    let filter =
        tracing_subscriber::EnvFilter::try_new(directives).context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    Ok(config)
}

async fn run_generate(config_path: Option<&Path>, options: &GenerateOptions) -> Result<()> {
    let mut config = load_config(config_path)?;
    options.apply(&mut config);
    config.validate()?;

    let session = create_graph_session(&config.neo4j).await?;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(
        cancel.clone(),
        options.deadline_secs.map(Duration::from_secs),
    );

    let report = generate(session, &config, options.partial_output.as_deref(), cancel).await?;
    if !report.warnings.is_empty() {
        info!("{} owner(s) dropped during validation", report.warnings.len());
    }
    Ok(())
}

async fn run_check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;

    let session = create_graph_session(&config.neo4j).await?;
    check(session.as_ref()).await
}
