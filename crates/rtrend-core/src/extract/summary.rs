//! Summary-line parsing: one independent pattern per tracked metric.

use regex::Regex;

use crate::error::TrendError;
use crate::report::ReportMetrics;

/// Substring identifying a summary line in a results log.
pub const SUMMARY_MARKER: &str = "summary =";

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The fixed set of metrics read from a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Samples,
    AvgResponseTime,
    ErrorRate,
    Throughput,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Samples,
        Metric::AvgResponseTime,
        Metric::ErrorRate,
        Metric::Throughput,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Samples => "samples",
            Metric::AvgResponseTime => "avg_response_time",
            Metric::ErrorRate => "error_rate",
            Metric::Throughput => "throughput",
        }
    }

    /// Store a captured value into `metrics`. Returns `false` when the text
    /// does not parse as the metric's number type, leaving the field unset.
    fn store(self, metrics: &mut ReportMetrics, raw: &str) -> bool {
        match self {
            Metric::Samples => raw.parse::<u64>().map(|v| metrics.samples = Some(v)).is_ok(),
            Metric::AvgResponseTime => raw
                .parse::<f64>()
                .map(|v| metrics.avg_response_time = Some(v))
                .is_ok(),
            Metric::ErrorRate => raw
                .parse::<f64>()
                .map(|v| metrics.error_rate = Some(v))
                .is_ok(),
            Metric::Throughput => raw
                .parse::<f64>()
                .map(|v| metrics.throughput = Some(v))
                .is_ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricPattern
// ---------------------------------------------------------------------------

/// A regular expression whose first capture group yields one metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricPattern {
    pub metric: Metric,
    pub pattern: &'static str,
}

impl MetricPattern {
    pub const fn new(metric: Metric, pattern: &'static str) -> Self {
        Self { metric, pattern }
    }

    /// The stock pattern for `metric`.
    pub const fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Samples => Self::new(metric, r"#samples=(\d+)"),
            Metric::AvgResponseTime => Self::new(metric, r"Avg:\s+(\d+(\.\d+)?)"),
            Metric::ErrorRate => Self::new(metric, r"Err:\s+(\d+(\.\d+)?)"),
            Metric::Throughput => Self::new(metric, r"req/s:\s+(\d+(\.\d+)?)"),
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryParser
// ---------------------------------------------------------------------------

/// Compiled metric patterns applied to a summary line.
pub struct SummaryParser {
    patterns: Vec<(Metric, Regex)>,
}

impl SummaryParser {
    /// Compile the stock pattern for every metric.
    pub fn new() -> Result<Self, TrendError> {
        Self::with_patterns(Metric::ALL.iter().map(|m| MetricPattern::for_metric(*m)))
    }

    pub fn with_patterns(
        patterns: impl IntoIterator<Item = MetricPattern>,
    ) -> Result<Self, TrendError> {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.pattern).map(|re| (p.metric, re)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Parse every metric independently. Patterns that do not match leave
    /// their metric absent.
    pub fn parse(&self, line: &str) -> ReportMetrics {
        let mut metrics = ReportMetrics::default();
        for (metric, re) in &self.patterns {
            let Some(raw) = re.captures(line).and_then(|caps| caps.get(1)) else {
                tracing::debug!(metric = metric.name(), "metric not present in summary line");
                continue;
            };
            if !metric.store(&mut metrics, raw.as_str()) {
                tracing::debug!(
                    metric = metric.name(),
                    value = raw.as_str(),
                    "metric value out of range"
                );
            }
        }
        metrics
    }
}

/// The last line of `log` containing the summary marker.
pub fn find_summary_line(log: &str) -> Option<&str> {
    log.lines().rev().find(|l| l.contains(SUMMARY_MARKER))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
