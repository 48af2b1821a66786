use serde::Serialize;

use super::TrendSeries;

pub const PRIMARY_AXIS: &str = "y-axis-1";
pub const SECONDARY_AXIS: &str = "y-axis-2";

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// One line on the chart, in the shape Chart.js expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    pub background_color: String,
    #[serde(rename = "yAxisID")]
    pub y_axis_id: String,
}

impl Dataset {
    fn new(label: &str, data: &[f64], rgb: (u8, u8, u8), axis: &str) -> Self {
        let (r, g, b) = rgb;
        Self {
            label: label.to_string(),
            data: data.to_vec(),
            border_color: format!("rgb({r}, {g}, {b})"),
            background_color: format!("rgba({r}, {g}, {b}, 0.5)"),
            y_axis_id: axis.to_string(),
        }
    }
}

/// The `labels` + `datasets` document written to `trend_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Response time and error rate share the left axis; throughput has the right.
pub fn chart_data(series: &TrendSeries) -> ChartData {
    ChartData {
        labels: series.labels.clone(),
        datasets: vec![
            Dataset::new(
                "Avg Response Time (ms)",
                &series.response_times,
                (255, 99, 132),
                PRIMARY_AXIS,
            ),
            Dataset::new(
                "Throughput (req/s)",
                &series.throughputs,
                (54, 162, 235),
                SECONDARY_AXIS,
            ),
            Dataset::new(
                "Error Rate (%)",
                &series.error_rates,
                (255, 159, 64),
                PRIMARY_AXIS,
            ),
        ],
    }
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Pretty-printed chart data with two-space indentation.
pub fn export_json(data: &ChartData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

// ---------------------------------------------------------------------------
// HTML export
// ---------------------------------------------------------------------------

/// Standalone trend page rendering `data` with Chart.js.
///
/// `report_count` is shown in the page heading.
pub fn export_html(data: &ChartData, report_count: usize) -> Result<String, serde_json::Error> {
    let chart_json = script_safe(&serde_json::to_string(data)?);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>JMeter Performance Trends</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 20px; }}
    .chart-container {{ width: 90%; height: 400px; margin: 20px auto; }}
  </style>
</head>
<body>
  <h1>JMeter Performance Trends</h1>
  <p>Showing trends from the last {report_count} test runs</p>

  <div class="chart-container">
    <canvas id="trendChart"></canvas>
  </div>

  <script>
    const chartData = {chart_json};

    const ctx = document.getElementById('trendChart').getContext('2d');
    const chart = new Chart(ctx, {{
      type: 'line',
      data: chartData,
      options: {{
        responsive: true,
        maintainAspectRatio: false,
        scales: {{
          x: {{
            title: {{
              display: true,
              text: 'Test Run Date/Time'
            }}
          }},
          '{primary}': {{
            type: 'linear',
            position: 'left',
            title: {{
              display: true,
              text: 'Response Time (ms) / Error Rate (%)'
            }}
          }},
          '{secondary}': {{
            type: 'linear',
            position: 'right',
            title: {{
              display: true,
              text: 'Throughput (req/s)'
            }},
            grid: {{
              drawOnChartArea: false
            }}
          }}
        }},
        plugins: {{
          tooltip: {{
            mode: 'index',
            intersect: false
          }}
        }}
      }}
    }});
  </script>
</body>
</html>
"#,
        report_count = report_count,
        chart_json = chart_json,
        primary = PRIMARY_AXIS,
        secondary = SECONDARY_AXIS,
    ))
}

/// Keep inline JSON from terminating the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series() -> TrendSeries {
        TrendSeries {
            labels: vec!["03-01 10:15".to_string(), "03-02 10:15".to_string()],
            response_times: vec![45.2, 50.0],
            throughputs: vec![33.7, 30.0],
            error_rates: vec![1.5, 0.0],
        }
    }

    #[test]
    fn chart_data_has_three_styled_datasets() {
        let data = chart_data(&make_series());
        assert_eq!(data.labels.len(), 2);
        assert_eq!(data.datasets.len(), 3);

        let rt = &data.datasets[0];
        assert_eq!(rt.label, "Avg Response Time (ms)");
        assert_eq!(rt.data, vec![45.2, 50.0]);
        assert_eq!(rt.border_color, "rgb(255, 99, 132)");
        assert_eq!(rt.background_color, "rgba(255, 99, 132, 0.5)");
        assert_eq!(rt.y_axis_id, "y-axis-1");

        assert_eq!(data.datasets[1].label, "Throughput (req/s)");
        assert_eq!(data.datasets[1].y_axis_id, "y-axis-2");
        assert_eq!(data.datasets[2].label, "Error Rate (%)");
        assert_eq!(data.datasets[2].border_color, "rgb(255, 159, 64)");
        assert_eq!(data.datasets[2].y_axis_id, "y-axis-1");
    }

    #[test]
    fn json_uses_chartjs_field_names() {
        let json = export_json(&chart_data(&make_series())).expect("export_json should not fail");
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("output should be valid JSON");
        let first = &parsed["datasets"][0];
        assert!(first.get("borderColor").is_some());
        assert!(first.get("backgroundColor").is_some());
        assert_eq!(first["yAxisID"], "y-axis-1");
        assert_eq!(parsed["labels"][0], "03-01 10:15");
        assert!(json.contains("\n  \"labels\""));
    }

    #[test]
    fn html_is_standalone_document() {
        let html = export_html(&chart_data(&make_series()), 2).expect("export_html should not fail");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(html.contains("https://cdn.jsdelivr.net/npm/chart.js"));
        assert!(html.contains("Showing trends from the last 2 test runs"));
        assert!(html.contains("'y-axis-2': {"));
        assert!(html.contains("drawOnChartArea: false"));
    }

    #[test]
    fn html_inlines_chart_json() {
        let data = chart_data(&make_series());
        let html = export_html(&data, 2).unwrap();
        let inline = serde_json::to_string(&data).unwrap();
        assert!(html.contains(&format!("const chartData = {inline};")));
    }

    #[test]
    fn html_escapes_script_terminators_in_labels() {
        let mut series = make_series();
        series.labels[0] = "</script><b>".to_string();
        let html = export_html(&chart_data(&series), 2).unwrap();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("<\\/script><b>"));
    }
}
