//! Idempotent insertion of the trend-chart link into the dashboard page.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::TrendError;

pub const TREND_LINK_ANCHOR: &str = r#"<a href="trend_chart.html">"#;
pub const TREND_LINK: &str =
    r#"<p><a href="trend_chart.html">View Performance Trends Chart</a></p>"#;
pub const HISTORY_HEADING: &str = "<h2>Test Reports History</h2>";
const BODY_CLOSE: &str = "</body>";

/// What happened to the dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOutcome {
    /// Link placed directly under the history heading.
    InsertedAfterHeading,
    /// No heading; link placed before `</body>`.
    InsertedBeforeBodyClose,
    /// The page already links to the chart.
    AlreadyLinked,
    /// Neither the heading nor `</body>` found; page left as is.
    NoInsertionPoint,
    /// There is no dashboard page to patch.
    DashboardMissing,
    /// Patching was turned off in the configuration.
    Skipped,
}

impl PatchOutcome {
    pub fn modified(self) -> bool {
        matches!(
            self,
            PatchOutcome::InsertedAfterHeading | PatchOutcome::InsertedBeforeBodyClose
        )
    }
}

/// Return the patched page content, or `None` when nothing should change.
pub fn insert_trend_link(content: &str) -> (Option<String>, PatchOutcome) {
    if content.contains(TREND_LINK_ANCHOR) {
        return (None, PatchOutcome::AlreadyLinked);
    }
    if content.contains(HISTORY_HEADING) {
        let patched =
            content.replace(HISTORY_HEADING, &format!("{HISTORY_HEADING}\n  {TREND_LINK}"));
        return (Some(patched), PatchOutcome::InsertedAfterHeading);
    }
    if content.contains(BODY_CLOSE) {
        let patched = content.replace(BODY_CLOSE, &format!("  {TREND_LINK}\n{BODY_CLOSE}"));
        return (Some(patched), PatchOutcome::InsertedBeforeBodyClose);
    }
    (None, PatchOutcome::NoInsertionPoint)
}

/// Patch the dashboard file at `path` in place.
///
/// The file is never created; a missing page yields
/// [`PatchOutcome::DashboardMissing`]. The file is only rewritten when the
/// link was actually inserted.
pub fn patch_dashboard(path: &Path) -> Result<PatchOutcome, TrendError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                "Dashboard {} not found; trend chart link not added",
                path.display()
            );
            return Ok(PatchOutcome::DashboardMissing);
        }
        Err(e) => return Err(e.into()),
    };

    let (patched, outcome) = insert_trend_link(&content);
    match patched {
        Some(patched) => {
            fs::write(path, patched)?;
            tracing::info!("Added trend chart link to {}", path.display());
        }
        None => tracing::debug!(?outcome, path = %path.display(), "dashboard left unchanged"),
    }
    Ok(outcome)
}
