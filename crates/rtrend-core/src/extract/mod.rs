//! Metric extractor: unpacks one report archive and reads its summary.
//!
//! Each archive is unpacked into its own temporary directory, which is removed
//! once the record has been read. A missing results log or summary line is a
//! soft failure (`Ok(None)`); an archive that cannot be unpacked is fatal.

pub mod summary;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use regex::Regex;

use crate::archive::archive_stem;
use crate::error::TrendError;
use crate::report::{ReportRecord, TIMESTAMP_KEY};

pub use summary::{find_summary_line, Metric, MetricPattern, SummaryParser, SUMMARY_MARKER};

pub const RESULTS_FILE: &str = "results.jtl";
pub const METADATA_FILE: &str = "metadata.txt";

const FILENAME_TIMESTAMP_PATTERN: &str = r"report_(\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})";
const SCRATCH_PREFIX: &str = "rtrend-";

// ---------------------------------------------------------------------------
// ReportExtractor
// ---------------------------------------------------------------------------

/// Reads [`ReportRecord`]s out of report archives.
pub struct ReportExtractor {
    parser: SummaryParser,
    filename_timestamp: Regex,
}

impl ReportExtractor {
    pub fn new() -> Result<Self, TrendError> {
        Ok(Self {
            parser: SummaryParser::new()?,
            filename_timestamp: Regex::new(FILENAME_TIMESTAMP_PATTERN)?,
        })
    }

    /// Extract the record for one archive.
    ///
    /// Returns `Ok(None)` when the archive holds no results log or the log
    /// has no summary line.
    pub fn extract(&self, archive: &Path) -> Result<Option<ReportRecord>, TrendError> {
        let scratch = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
        unpack_archive(archive, scratch.path())?;

        let record = self.read_unpacked(archive, scratch.path())?;

        if let Err(e) = scratch.close() {
            tracing::warn!("Failed to remove scratch directory: {e}");
        }
        Ok(record)
    }

    fn read_unpacked(
        &self,
        archive: &Path,
        root: &Path,
    ) -> Result<Option<ReportRecord>, TrendError> {
        let Some(results) = find_file(root, RESULTS_FILE)? else {
            tracing::warn!("No {RESULTS_FILE} found in {}", archive.display());
            return Ok(None);
        };

        let mut metadata = match find_file(root, METADATA_FILE)? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "reading metadata");
                parse_metadata(&read_lossy(&path)?)
            }
            None => HashMap::new(),
        };

        let filename = archive_stem(archive);
        if !metadata.contains_key(TIMESTAMP_KEY) {
            if let Some(ts) = self.timestamp_from_filename(&filename) {
                metadata.insert(TIMESTAMP_KEY.to_string(), ts);
            }
        }

        let log = read_lossy(&results)?;
        let Some(line) = find_summary_line(&log) else {
            tracing::warn!("No summary line found in {}", results.display());
            return Ok(None);
        };

        Ok(Some(ReportRecord {
            metadata,
            metrics: self.parser.parse(line),
            filename,
        }))
    }

    /// Recover `YYYY-MM-DD HH-MM-SS` from a `report_YYYY-MM-DD_HH-MM-SS` name.
    pub fn timestamp_from_filename(&self, name: &str) -> Option<String> {
        self.filename_timestamp
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace('_', " "))
    }
}

/// Extract a single archive with the stock patterns.
pub fn extract_report(archive: &Path) -> Result<Option<ReportRecord>, TrendError> {
    ReportExtractor::new()?.extract(archive)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Unpack a gzip-compressed tar archive into `dest`.
fn unpack_archive(archive: &Path, dest: &Path) -> Result<(), TrendError> {
    let file = fs::File::open(archive).map_err(|e| TrendError::archive(archive, e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(dest)
        .map_err(|e| TrendError::archive(archive, e))
}

/// First file called `name` under `root`. Files in a directory are checked
/// before its subdirectories; entries are visited in name order.
fn find_file(root: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(root)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() && entry.file_name() == name {
            return Ok(Some(entry.path()));
        }
    }

    for dir in subdirs {
        if let Some(found) = find_file(&dir, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse `key: value` lines. Lines without a colon are ignored; the first
/// colon splits key from value and both sides are trimmed.
pub fn parse_metadata(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.trim().split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
