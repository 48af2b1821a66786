use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::archive::list_archives;
use crate::config::TrendConfig;
use crate::dashboard::{patch_dashboard, PatchOutcome};
use crate::error::TrendError;
use crate::extract::ReportExtractor;
use crate::report::ReportRecord;
use crate::trend::export::{chart_data, export_html, export_json};
use crate::trend::{build_series, compare_latest, TrendDelta};

/// Summary of a run that wrote the chart artifacts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrendReport {
    pub data_path: PathBuf,
    pub chart_path: PathBuf,
    /// Archives found by the locator (after the `max_reports` cut).
    pub archives_found: usize,
    /// Reports that yielded a record and appear in the chart.
    pub reports_included: usize,
    pub dashboard: PatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_delta: Option<TrendDelta>,
}

#[derive(Debug, Clone)]
pub enum TrendOutcome {
    /// The history directory held no archives; nothing was written.
    NoArchives,
    Generated(TrendReport),
}

/// Run the whole locate, extract, aggregate and emit pipeline.
///
/// Archives are processed one at a time. An archive that cannot be unpacked
/// aborts the run; an archive without a usable summary is skipped.
pub fn generate_trend(config: &TrendConfig) -> Result<TrendOutcome, TrendError> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)?;

    let archives = list_archives(&config.history_dir, config.max_reports)?;
    if archives.is_empty() {
        return Ok(TrendOutcome::NoArchives);
    }

    let extractor = ReportExtractor::new()?;
    let mut records: Vec<ReportRecord> = Vec::with_capacity(archives.len());
    for archive in &archives {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!("Processing {name}...");
        if let Some(record) = extractor.extract(archive)? {
            records.push(record);
        }
    }

    let series = build_series(&records);
    let data = chart_data(&series);

    let data_path = config.data_path();
    fs::write(&data_path, export_json(&data)?)?;

    let chart_path = config.chart_path();
    fs::write(&chart_path, export_html(&data, series.len())?)?;
    tracing::info!("Trend chart generated: {}", chart_path.display());

    let dashboard = if config.patch_dashboard {
        patch_dashboard(&config.dashboard_path())?
    } else {
        PatchOutcome::Skipped
    };

    Ok(TrendOutcome::Generated(TrendReport {
        data_path,
        chart_path,
        archives_found: archives.len(),
        reports_included: series.len(),
        dashboard,
        latest_delta: compare_latest(&records),
    }))
}
