pub mod export;

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::report::ReportRecord;

/// Timestamp layout written by the report archiver.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";
/// Abbreviated layout used for chart labels.
pub const LABEL_FORMAT: &str = "%m-%d %H:%M";

// ---------------------------------------------------------------------------
// TrendSeries
// ---------------------------------------------------------------------------

/// Chart-ready series, one entry per report in chronological order.
///
/// All four vectors always have the same length; index `i` in each refers to
/// the same report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub response_times: Vec<f64>,
    pub throughputs: Vec<f64>,
    pub error_rates: Vec<f64>,
}

impl TrendSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, record: &ReportRecord) {
        let m = &record.metrics;
        self.labels.push(label_for(record));
        self.response_times.push(m.avg_response_time.unwrap_or(0.0));
        self.throughputs.push(m.throughput.unwrap_or(0.0));
        self.error_rates.push(m.error_rate.unwrap_or(0.0));
    }
}

/// Order records by their `Timestamp` metadata, oldest first.
///
/// Comparison is lexicographic; a record without a timestamp sorts as the
/// empty string. The sort is stable.
pub fn chronological(records: &[ReportRecord]) -> Vec<&ReportRecord> {
    let mut sorted: Vec<&ReportRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare_timestamps(a, b));
    sorted
}

fn compare_timestamps(a: &ReportRecord, b: &ReportRecord) -> Ordering {
    a.timestamp().unwrap_or("").cmp(b.timestamp().unwrap_or(""))
}

/// Build the trend series. Missing metrics become `0`.
pub fn build_series(records: &[ReportRecord]) -> TrendSeries {
    let mut series = TrendSeries::default();
    for record in chronological(records) {
        series.push(record);
    }
    series
}

/// Abbreviate `YYYY-MM-DD HH-MM-SS` to `MM-DD HH:MM`; anything else is
/// returned unchanged.
pub fn format_label(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT) {
        Ok(dt) => dt.format(LABEL_FORMAT).to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn label_for(record: &ReportRecord) -> String {
    match record.timestamp() {
        Some(ts) if !ts.is_empty() => format_label(ts),
        _ => record.filename.clone(),
    }
}

// ---------------------------------------------------------------------------
// TrendDelta
// ---------------------------------------------------------------------------

/// Metric differences between the two most recent reports
/// (`current - baseline`). A delta is `None` when either run lacks the metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrendDelta {
    pub baseline: String,
    pub current: String,
    pub delta_samples: Option<i64>,
    pub delta_avg_response_time: Option<f64>,
    pub delta_error_rate: Option<f64>,
    pub delta_throughput: Option<f64>,
}

/// Compare the newest report with its predecessor. `None` with fewer than two
/// reports.
pub fn compare_latest(records: &[ReportRecord]) -> Option<TrendDelta> {
    let sorted = chronological(records);
    let [.., baseline, current] = sorted.as_slice() else {
        return None;
    };
    let (a, b) = (&baseline.metrics, &current.metrics);

    let diff = |x: Option<f64>, y: Option<f64>| Some(y? - x?);

    Some(TrendDelta {
        baseline: label_for(baseline),
        current: label_for(current),
        delta_samples: sample_delta(a.samples, b.samples),
        delta_avg_response_time: diff(a.avg_response_time, b.avg_response_time),
        delta_error_rate: diff(a.error_rate, b.error_rate),
        delta_throughput: diff(a.throughput, b.throughput),
    })
}

/// `current - baseline`, or `None` when the difference does not fit an `i64`.
fn sample_delta(baseline: Option<u64>, current: Option<u64>) -> Option<i64> {
    let baseline = i64::try_from(baseline?).ok()?;
    let current = i64::try_from(current?).ok()?;
    current.checked_sub(baseline)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportMetrics, TIMESTAMP_KEY};
    use std::collections::HashMap;

    fn make_record(filename: &str, timestamp: Option<&str>, avg: Option<f64>) -> ReportRecord {
        let mut metadata = HashMap::new();
        if let Some(ts) = timestamp {
            metadata.insert(TIMESTAMP_KEY.to_string(), ts.to_string());
        }
        ReportRecord {
            metadata,
            metrics: ReportMetrics {
                samples: Some(100),
                avg_response_time: avg,
                error_rate: Some(1.0),
                throughput: Some(20.0),
            },
            filename: filename.to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // format_label
    // -----------------------------------------------------------------------

    #[test]
    fn label_abbreviates_archive_timestamp() {
        assert_eq!(format_label("2024-03-01 10-15-30"), "03-01 10:15");
    }

    #[test]
    fn label_keeps_unparseable_timestamp() {
        assert_eq!(format_label("2024-03-01 10:15:30"), "2024-03-01 10:15:30");
        assert_eq!(format_label("yesterday"), "yesterday");
    }

    #[test]
    fn label_falls_back_to_filename() {
        let series = build_series(&[make_record("report_latest", None, Some(1.0))]);
        assert_eq!(series.labels, vec!["report_latest"]);
    }

    #[test]
    fn empty_timestamp_falls_back_to_filename() {
        let series = build_series(&[make_record("report_x", Some(""), Some(1.0))]);
        assert_eq!(series.labels, vec!["report_x"]);
    }

    // -----------------------------------------------------------------------
    // build_series
    // -----------------------------------------------------------------------

    #[test]
    fn series_sorted_ascending_with_equal_lengths() {
        let records = vec![
            make_record("c", Some("2024-03-03 09-00-00"), Some(30.0)),
            make_record("a", Some("2024-03-01 09-00-00"), Some(10.0)),
            make_record("b", Some("2024-03-02 09-00-00"), Some(20.0)),
        ];
        let series = build_series(&records);

        assert_eq!(series.len(), 3);
        assert_eq!(series.response_times.len(), 3);
        assert_eq!(series.throughputs.len(), 3);
        assert_eq!(series.error_rates.len(), 3);
        assert_eq!(series.labels, vec!["03-01 09:00", "03-02 09:00", "03-03 09:00"]);
        assert_eq!(series.response_times, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn missing_timestamp_sorts_first() {
        let records = vec![
            make_record("dated", Some("2024-01-01 00-00-00"), Some(2.0)),
            make_record("undated", None, Some(1.0)),
        ];
        let series = build_series(&records);
        assert_eq!(series.labels[0], "undated");
        assert_eq!(series.response_times, vec![1.0, 2.0]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let records = vec![
            make_record("first", Some("same"), Some(1.0)),
            make_record("second", Some("same"), Some(2.0)),
        ];
        let series = build_series(&records);
        assert_eq!(series.response_times, vec![1.0, 2.0]);
    }

    #[test]
    fn missing_metrics_default_to_zero() {
        let mut record = make_record("r", Some("2024-01-01 00-00-00"), None);
        record.metrics = ReportMetrics::default();
        let series = build_series(&[record]);
        assert_eq!(series.response_times, vec![0.0]);
        assert_eq!(series.throughputs, vec![0.0]);
        assert_eq!(series.error_rates, vec![0.0]);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let series = build_series(&[]);
        assert!(series.is_empty());
        assert_eq!(series, TrendSeries::default());
    }

    // -----------------------------------------------------------------------
    // compare_latest
    // -----------------------------------------------------------------------

    #[test]
    fn compare_latest_needs_two_reports() {
        assert!(compare_latest(&[]).is_none());
        assert!(compare_latest(&[make_record("a", None, Some(1.0))]).is_none());
    }

    #[test]
    fn compare_latest_uses_two_newest_reports() {
        let mut newest = make_record("n", Some("2024-03-03 09-00-00"), Some(55.0));
        newest.metrics.samples = Some(90);
        newest.metrics.throughput = Some(18.5);
        let records = vec![
            newest,
            make_record("o", Some("2024-03-01 09-00-00"), Some(10.0)),
            make_record("m", Some("2024-03-02 09-00-00"), Some(50.0)),
        ];

        let delta = compare_latest(&records).expect("delta");
        assert_eq!(delta.baseline, "03-02 09:00");
        assert_eq!(delta.current, "03-03 09:00");
        assert_eq!(delta.delta_samples, Some(-10));
        assert!((delta.delta_avg_response_time.unwrap() - 5.0).abs() < 1e-9);
        assert!((delta.delta_throughput.unwrap() - (-1.5)).abs() < 1e-9);
        assert_eq!(delta.delta_error_rate, Some(0.0));
    }

    #[test]
    fn compare_latest_missing_metric_gives_none() {
        let records = vec![
            make_record("a", Some("1"), None),
            make_record("b", Some("2"), Some(4.0)),
        ];
        let delta = compare_latest(&records).expect("delta");
        assert!(delta.delta_avg_response_time.is_none());
        assert_eq!(delta.delta_samples, Some(0));
    }

    #[test]
    fn compare_latest_sample_delta_beyond_i64_is_none() {
        let mut older = make_record("a", Some("1"), Some(1.0));
        older.metrics.samples = Some(1);
        let mut newer = make_record("b", Some("2"), Some(1.0));
        newer.metrics.samples = Some(i64::MAX as u64 + 1);

        let delta = compare_latest(&[older, newer]).expect("delta");
        assert!(delta.delta_samples.is_none());
        assert!((delta.delta_avg_response_time.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn compare_latest_sample_delta_at_i64_max() {
        let mut older = make_record("a", Some("1"), Some(1.0));
        older.metrics.samples = Some(0);
        let mut newer = make_record("b", Some("2"), Some(1.0));
        newer.metrics.samples = Some(i64::MAX as u64);

        let delta = compare_latest(&[older, newer]).expect("delta");
        assert_eq!(delta.delta_samples, Some(i64::MAX));
    }
}
