//! Atomic export of schema documents

use graphschema_core::{Error, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Serialize `document` as JSON and atomically replace `path` with it
///
/// The document is written to a temporary file in the destination directory,
/// flushed and synced, then renamed over `path`. Readers see either the old
/// file or the complete new one, and a failure leaves no file behind.
pub fn write_document<T: Serialize>(document: &T, path: &Path, pretty: bool) -> Result<()> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(document)
    } else {
        serde_json::to_vec(document)
    }
    .map_err(|e| Error::export(format!("Failed to serialize schema document: {e}")))?;
    bytes.push(b'\n');

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(directory).map_err(|e| {
        Error::export(format!(
            "Failed to create temporary file in {}: {e}",
            directory.display()
        ))
    })?;
    let write = |file: &mut NamedTempFile| -> std::io::Result<()> {
        file.write_all(&bytes)?;
        file.flush()?;
        file.as_file().sync_all()
    };
    write(&mut staged)
        .map_err(|e| Error::export(format!("Failed to write schema document: {e}")))?;

    staged.persist(path).map_err(|e| {
        Error::export(format!(
            "Failed to move schema document into place at {}: {}",
            path.display(),
            e.error
        ))
    })?;

    info!("Wrote schema document to {}", path.display());
    Ok(())
}
