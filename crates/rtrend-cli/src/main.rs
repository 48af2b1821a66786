//! `rtrend`: render a trend chart from historical load-test report archives.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rtrend_core::config::{DEFAULT_HISTORY_DIR, DEFAULT_MAX_REPORTS, DEFAULT_OUTPUT_DIR};
use rtrend_core::trend::TrendDelta;
use rtrend_core::{generate_trend, TrendConfig, TrendOutcome, TrendReport};
use tracing::Level;

/// Generate trend charts from historical JMeter report archives.
#[derive(Parser, Debug)]
#[command(name = "rtrend")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing historical report archives.
    #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
    history_dir: PathBuf,

    /// Directory to write the trend chart into.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Maximum number of reports to include (0 or negative for all).
    #[arg(long, default_value_t = DEFAULT_MAX_REPORTS, allow_negative_numbers = true)]
    max_reports: i64,

    /// Do not add a link to the chart in the dashboard's index.html.
    #[arg(long)]
    no_dashboard_link: bool,

    /// Print the run summary as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn config(&self) -> TrendConfig {
        TrendConfig {
            history_dir: self.history_dir.clone(),
            output_dir: self.output_dir.clone(),
            max_reports: self.max_reports,
            patch_dashboard: !self.no_dashboard_link,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the run summary.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match generate_trend(&cli.config()) {
        Ok(TrendOutcome::Generated(report)) if cli.json => match json_summary(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Ok(TrendOutcome::Generated(report)) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Ok(TrendOutcome::NoArchives) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn json_summary(report: &TrendReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

fn print_report(report: &TrendReport) {
    println!(
        "Included {} of {} report archives",
        report.reports_included, report.archives_found
    );
    println!("  data:  {}", report.data_path.display());
    println!("  chart: {}", report.chart_path.display());
    if let Some(delta) = &report.latest_delta {
        print_delta(delta);
    }
}

fn print_delta(delta: &TrendDelta) {
    println!("Latest run {} vs {}:", delta.current, delta.baseline);
    println!("  samples:       {}", fmt_signed_int(delta.delta_samples));
    println!(
        "  avg response:  {}",
        fmt_signed(delta.delta_avg_response_time, "ms")
    );
    println!("  error rate:    {}", fmt_signed(delta.delta_error_rate, "%"));
    println!(
        "  throughput:    {}",
        fmt_signed(delta.delta_throughput, " req/s")
    );
}

fn fmt_signed(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:+.2}{unit}"),
        None => "n/a".to_string(),
    }
}

fn fmt_signed_int(value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{v:+}"),
        None => "n/a".to_string(),
    }
}
