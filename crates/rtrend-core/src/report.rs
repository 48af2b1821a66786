use std::collections::HashMap;

/// Metadata key holding the run timestamp.
pub const TIMESTAMP_KEY: &str = "Timestamp";

/// Scalar metrics parsed from one summary line. Each is absent when its
/// pattern did not match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportMetrics {
    pub samples: Option<u64>,
    pub avg_response_time: Option<f64>,
    pub error_rate: Option<f64>,
    pub throughput: Option<f64>,
}

/// Everything extracted from a single report archive.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    /// Free-form `key: value` pairs from `metadata.txt`, plus a recovered
    /// `Timestamp` when the file lacked one.
    pub metadata: HashMap<String, String>,
    pub metrics: ReportMetrics,
    /// Archive base name without the `.tar.gz` suffix.
    pub filename: String,
}

impl ReportRecord {
    pub fn timestamp(&self) -> Option<&str> {
        self.metadata.get(TIMESTAMP_KEY).map(String::as_str)
    }
}
