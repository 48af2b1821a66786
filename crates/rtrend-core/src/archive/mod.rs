//! Archive locator: finds `report_*.tar.gz` bundles in the history directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::TrendError;

pub const ARCHIVE_PREFIX: &str = "report_";
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Whether `name` follows the `report_*.tar.gz` naming pattern.
pub fn is_report_archive(name: &str) -> bool {
    name.len() >= ARCHIVE_PREFIX.len() + ARCHIVE_SUFFIX.len()
        && name.starts_with(ARCHIVE_PREFIX)
        && name.ends_with(ARCHIVE_SUFFIX)
}

/// Base file name of an archive with the `.tar.gz` suffix removed.
pub fn archive_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(ARCHIVE_SUFFIX) {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// List report archives in `dir`, newest first by modification time.
///
/// `max_reports <= 0` returns every archive; otherwise at most `max_reports`
/// of the most recently modified. A missing or empty directory yields an
/// empty list and a notice, not an error.
pub fn list_archives(dir: &Path, max_reports: i64) -> Result<Vec<PathBuf>, TrendError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("No report archives found in {}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_report_archive(name) {
            continue;
        }
        // Follows symlinks so a linked archive sorts by its target's mtime.
        let meta = match fs::metadata(entry.path()) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("Skipping dangling link {}", entry.path().display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified()?;
        found.push((modified, entry.path()));
    }

    // Newest first; name breaks ties so the listing is deterministic.
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

    if let Some(limit) = usize::try_from(max_reports).ok().filter(|n| *n > 0) {
        found.truncate(limit);
    }

    if found.is_empty() {
        tracing::info!("No report archives found in {}", dir.display());
    } else {
        tracing::debug!(count = found.len(), dir = %dir.display(), "located report archives");
    }

    Ok(found.into_iter().map(|(_, path)| path).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
