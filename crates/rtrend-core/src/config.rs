use std::path::PathBuf;

use crate::error::TrendError;

pub const DEFAULT_HISTORY_DIR: &str = "../history";
pub const DEFAULT_OUTPUT_DIR: &str = "../dashboard";
pub const DEFAULT_MAX_REPORTS: i64 = 10;

pub const TREND_DATA_FILE: &str = "trend_data.json";
pub const TREND_CHART_FILE: &str = "trend_chart.html";
pub const DASHBOARD_FILE: &str = "index.html";

/// Settings for a single trend generation run.
#[derive(Debug, Clone)]
pub struct TrendConfig {
    /// Directory holding the `report_*.tar.gz` archives.
    pub history_dir: PathBuf,
    /// Directory receiving the chart artifacts; also holds the dashboard page.
    pub output_dir: PathBuf,
    /// Maximum number of archives to include. `0` or negative means no limit.
    pub max_reports: i64,
    /// Whether to insert a link to the chart into the dashboard's `index.html`.
    pub patch_dashboard: bool,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_reports: DEFAULT_MAX_REPORTS,
            patch_dashboard: true,
        }
    }
}

impl TrendConfig {
    pub fn new(history_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            history_dir: history_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TrendError> {
        if self.history_dir.as_os_str().is_empty() {
            return Err(TrendError::Config(
                "history directory must not be empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(TrendError::Config(
                "output directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        self.output_dir.join(TREND_DATA_FILE)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(TREND_CHART_FILE)
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.output_dir.join(DASHBOARD_FILE)
    }
}
