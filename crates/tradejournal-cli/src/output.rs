//! Persisting the rendered workbook

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory the workbook is written to when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Write `bytes` as `file_name` inside `primary_dir`, creating the directory
/// if needed. If that fails, write into `fallback_dir` instead.
///
/// Returns the path actually written.
pub fn write_with_fallback(
    primary_dir: &Path,
    fallback_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    let primary = primary_dir.join(file_name);
    match write_into(primary_dir, &primary, bytes) {
        Ok(()) => {
            info!(path = %primary.display(), "workbook written");
            Ok(primary)
        }
        Err(err) => {
            warn!(
                path = %primary.display(),
                error = %err,
                "could not write workbook, falling back to {}",
                fallback_dir.display()
            );
            let fallback = fallback_dir.join(file_name);
            fs::write(&fallback, bytes)
                .with_context(|| format!("failed to write {}", fallback.display()))?;
            info!(path = %fallback.display(), "workbook written to fallback location");
            Ok(fallback)
        }
    }
}

fn write_into(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(path, bytes)
}
