use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use super::template::Vars;
use crate::color::parse_color;
use crate::data::filter::FilterPredicate;
use crate::data::loader::TableFormat;
use crate::error::ChartError;

// ---------------------------------------------------------------------------
// Plan types (as written in a plan file)
// ---------------------------------------------------------------------------

/// One input file. `path` and the explicit column names are templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: String,
    /// Value written into the job's tag column for every row of this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub format: TableFormat,
}

/// Style of the line drawn for one tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub tag: String,
    /// Legend text template; the tag itself when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// CSS colour name or hex code; picked from the palette when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke width in pixels.
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    /// Draw a circle at every point.
    #[serde(default)]
    pub marker: bool,
}

/// A family of charts sharing inputs, filter and layout: one chart per metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartJob {
    pub name: String,
    pub sources: Vec<SourceSpec>,
    #[serde(default = "default_tag_column")]
    pub tag_column: String,
    #[serde(default)]
    pub filter: FilterPredicate,
    pub x_column: String,
    #[serde(default = "default_metric_template")]
    pub y_column: String,
    pub metrics: Vec<String>,
    pub title: String,
    pub x_label: String,
    #[serde(default = "default_metric_template")]
    pub y_label: String,
    /// Output path template, relative to the plan's output directory.
    pub output: String,
    /// Series in drawing and legend order. Empty means one series per
    /// distinct tag value, in order of first appearance.
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
    /// Canvas size in pixels.
    #[serde(default = "default_size")]
    pub size: (u32, u32),
}

fn default_line_width() -> u32 {
    2
}

fn default_tag_column() -> String {
    "Series".to_string()
}

fn default_metric_template() -> String {
    "{metric}".to_string()
}

fn default_size() -> (u32, u32) {
    (800, 600)
}

// ---------------------------------------------------------------------------
// Resolved chart: every template filled in for one metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub tag: Option<String>,
    pub format: TableFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub tag: String,
    pub label: String,
    pub color: Option<RGBColor>,
    pub line_width: u32,
    pub marker: bool,
}

/// Everything needed to produce one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChart {
    pub metric: String,
    pub sources: Vec<ResolvedSource>,
    pub tag_column: String,
    pub filter: FilterPredicate,
    pub x_column: String,
    pub y_column: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub output: PathBuf,
    pub series: Vec<ResolvedSeries>,
    pub size: (u32, u32),
}

impl ChartJob {
    /// Fill in the templates for `metric`. Relative source paths are joined
    /// onto `input_dir` and the output path onto `output_dir`.
    pub fn resolve(
        &self,
        metric: &str,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<ResolvedChart, ChartError> {
        let vars = Vars::for_chart(metric, &self.filter);

        let sources = self
            .sources
            .iter()
            .map(|source| -> Result<ResolvedSource, ChartError> {
                let columns = source
                    .format
                    .columns
                    .as_deref()
                    .map(|cols| vars.render_all(cols))
                    .transpose()?;
                Ok(ResolvedSource {
                    path: input_dir.join(vars.render(&source.path)?),
                    tag: source.tag.clone(),
                    format: TableFormat {
                        delimiter: source.format.delimiter,
                        columns,
                    },
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;

        let series = self
            .series
            .iter()
            .map(|s| -> Result<ResolvedSeries, ChartError> {
                Ok(ResolvedSeries {
                    tag: s.tag.clone(),
                    label: match &s.label {
                        Some(label) => vars.render(label)?,
                        None => s.tag.clone(),
                    },
                    color: s.color.as_deref().map(parse_color).transpose()?,
                    line_width: s.line_width,
                    marker: s.marker,
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;

        Ok(ResolvedChart {
            metric: metric.to_string(),
            sources,
            tag_column: self.tag_column.clone(),
            filter: self.filter.clone(),
            x_column: vars.render(&self.x_column)?,
            y_column: vars.render(&self.y_column)?,
            title: vars.render(&self.title)?,
            x_label: vars.render(&self.x_label)?,
            y_label: vars.render(&self.y_label)?,
            output: output_dir.join(vars.render(&self.output)?),
            series,
            size: self.size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::Delimiter;

    fn flow_job() -> ChartJob {
        serde_json::from_str(
            r#"{
                "name": "tcp",
                "sources": [
                    {"path": "flow0-{metric}.data", "tag": "flow0",
                     "format": {"delimiter": "whitespace", "columns": ["Time", "{METRIC}"]}}
                ],
                "tag_column": "Flow",
                "x_column": "Time",
                "metrics": ["cwnd"],
                "title": "{METRIC} Over Time",
                "x_label": "Time (s)",
                "output": "plots/Flow_{METRIC}.png",
                "series": [{"tag": "flow0", "label": "Flow 0 {metric}", "color": "black"}],
                "size": [1200, 600]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn plan_defaults_are_filled_in() {
        let job = flow_job();
        assert_eq!(job.y_column, "{metric}");
        assert_eq!(job.y_label, "{metric}");
        assert!(job.filter.is_empty());
        assert_eq!(job.series[0].line_width, 2);
        assert!(!job.series[0].marker);
    }

    #[test]
    fn resolve_fills_every_template() {
        let mut job = flow_job();
        job.y_column = "{METRIC}".into();
        let (data, out) = (Path::new("/data"), Path::new("/out"));
        let chart = job.resolve("cwnd", data, out).unwrap();

        assert_eq!(chart.sources[0].path, Path::new("/data/flow0-cwnd.data"));
        assert_eq!(chart.sources[0].format.delimiter, Delimiter::Whitespace);
        assert_eq!(
            chart.sources[0].format.columns.as_deref(),
            Some(&["Time".to_string(), "CWND".to_string()][..])
        );
        assert_eq!(chart.y_column, "CWND");
        assert_eq!(chart.title, "CWND Over Time");
        assert_eq!(chart.output, Path::new("/out/plots/Flow_CWND.png"));
        assert_eq!(chart.series[0].label, "Flow 0 cwnd");
        assert_eq!(chart.series[0].color, Some(RGBColor(0, 0, 0)));
    }

    #[test]
    fn resolve_is_deterministic() {
        let job = flow_job();
        let a = job.resolve("rtt", Path::new("."), Path::new(".")).unwrap();
        let b = job.resolve("rtt", Path::new("."), Path::new(".")).unwrap();
        assert_eq!(a.output, b.output);
    }

    #[test]
    fn bad_colour_fails_resolution() {
        let mut job = flow_job();
        job.series[0].color = Some("not-a-colour".into());
        assert!(matches!(
            job.resolve("cwnd", Path::new("."), Path::new(".")),
            Err(ChartError::UnknownColor { .. })
        ));
    }
}
