//! Command implementations for the graphschema binary

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use graphschema_core::Config;
use graphschema_inference::{write_document, AssemblyError, SchemaAssembler, SchemaReport};
use graphschema_storage::GraphSession;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Flags of the `generate` command that override configuration
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub output: Option<PathBuf>,
    pub workers: Option<usize>,
    pub deadline_secs: Option<u64>,
    pub pretty: bool,
    pub partial_output: Option<PathBuf>,
}

impl GenerateOptions {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(workers) = self.workers {
            config.validation.max_concurrent_probes = workers;
        }
        if self.pretty {
            config.output.pretty = true;
        }
    }
}

const LOG_TARGETS: [&str; 4] = [
    "graphschema",
    "graphschema_core",
    "graphschema_storage",
    "graphschema_inference",
];

/// Filter directives for the log subscriber
///
/// `--verbose` always enables debug output for the graphschema crates, even
/// when `RUST_LOG` is set; otherwise `RUST_LOG` is used when present, falling
/// back to info level.
pub fn log_directives(verbose: bool, rust_log: Option<&str>) -> String {
    let per_crate = |level: &str| {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    };

    match rust_log.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) if verbose => format!("{directives},{}", per_crate("debug")),
        Some(directives) => directives.to_string(),
        None if verbose => per_crate("debug"),
        None => per_crate("info"),
    }
}

/// Cancel `token` on Ctrl-C or once `deadline` elapses
pub fn cancel_on_interrupt(token: CancellationToken, deadline: Option<Duration>) {
    tokio::spawn(async move {
        let deadline_elapsed = async {
            match deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    info!("Received Ctrl+C, cancelling schema generation");
                    token.cancel();
                }
                Err(e) => error!("Error setting up signal handler: {e}"),
            },
            _ = deadline_elapsed => {
                warn!("Deadline reached, cancelling schema generation");
                token.cancel();
            }
        }
    });
}

/// Assemble the schema over `session` and write it to the configured path
///
/// On failure the canonical output is left untouched; the labeled partial
/// document goes to `partial_output` when one is given.
pub async fn generate(
    session: Arc<dyn GraphSession>,
    config: &Config,
    partial_output: Option<&std::path::Path>,
    cancel: CancellationToken,
) -> Result<SchemaReport> {
    let assembler = SchemaAssembler::from_session(session, &config.validation, cancel);

    match assembler.assemble().await {
        Ok(report) => {
            for warning in &report.warnings {
                warn!("{warning}");
            }
            write_document(&report.schema, &config.output.path, config.output.pretty)?;
            info!(
                "Schema written: {} labels, {} relationship types, {} topology sources",
                report.schema.node_properties.len(),
                report.schema.relationship_properties.len(),
                report.schema.topology.len()
            );
            Ok(report)
        }
        Err(err) => {
            if let (Some(path), Some(partial)) = (partial_output, err.partial()) {
                write_document(partial, path, config.output.pretty)
                    .context("Failed to write partial schema document")?;
                warn!("Partial schema document written to {}", path.display());
            }
            if let AssemblyError::Incomplete { failures, .. } = &err {
                for (aspect, failure) in failures {
                    error!("{aspect} failed: {failure}");
                }
            }
            Err(graphschema_core::Error::from(err).into())
        }
    }
}

/// Verify that the database is reachable with the configured credentials
pub async fn check(session: &dyn GraphSession) -> Result<()> {
    session
        .ping()
        .await
        .context("Neo4j connection check failed")?;
    info!("Neo4j connection OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_log_level_is_info() {
        assert_eq!(
            log_directives(false, None),
            "graphschema=info,graphschema_core=info,graphschema_storage=info,graphschema_inference=info"
        );
    }

    #[test]
    fn test_rust_log_is_used_without_verbose() {
        assert_eq!(log_directives(false, Some("warn")), "warn");
        assert_eq!(
            log_directives(false, Some("  ")),
            log_directives(false, None)
        );
    }

    #[test]
    fn test_verbose_wins_over_rust_log() {
        let directives = log_directives(true, Some("warn"));
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("graphschema_inference=debug"));
        assert!(directives.contains("graphschema=debug"));
    }
}
