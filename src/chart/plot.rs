use std::ops::Range;

use plotters::style::RGBColor;

use super::job::{ResolvedChart, ResolvedSeries};
use crate::color::generate_palette;
use crate::data::model::{Row, Table, Value};
use crate::error::ChartError;

/// One drawn line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub color: RGBColor,
    pub line_width: u32,
    pub marker: bool,
    pub points: Vec<(f64, f64)>,
}

/// A chart ready to be drawn by a [`Renderer`](super::render::Renderer).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub size: (u32, u32),
    pub series: Vec<PlotSeries>,
}

impl ChartPlot {
    pub fn x_range(&self) -> Range<f64> {
        let xs = self.series.iter().flat_map(|s| &s.points).map(|p| p.0);
        axis_range(xs)
    }

    pub fn y_range(&self) -> Range<f64> {
        let ys = self.series.iter().flat_map(|s| &s.points).map(|p| p.1);
        axis_range(ys)
    }
}

/// Data bounds with a 5% margin on both sides. Falls back to `0..1` when
/// there is nothing to show and widens a zero-width span around its value.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad)..(max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Partition `table` by the chart's tag column and turn each group into a
/// line of `(x, y)` points in row order.
///
/// Groups follow the chart's series order. With no series configured every
/// distinct tag value gets a palette colour, in order of first appearance;
/// a table without the tag column is then drawn as a single line.
pub fn build_plot(table: &Table, chart: &ResolvedChart) -> Result<ChartPlot, ChartError> {
    for column in [&chart.x_column, &chart.y_column] {
        if !table.has_column(column) {
            return Err(ChartError::UnknownColumn {
                column: column.clone(),
            });
        }
    }

    let groups = if !chart.series.is_empty() {
        if !table.has_column(&chart.tag_column) {
            return Err(ChartError::UnknownColumn {
                column: chart.tag_column.clone(),
            });
        }
        configured_groups(table, chart)
    } else if table.has_column(&chart.tag_column) {
        discovered_groups(table, chart)
    } else {
        let line = series_points(table.rows().iter(), chart);
        vec![PlotSeries {
            label: chart.y_label.clone(),
            color: generate_palette(1)[0],
            line_width: 2,
            marker: false,
            points: line,
        }]
    };

    let series: Vec<PlotSeries> = groups
        .into_iter()
        .filter(|s| {
            if s.points.is_empty() {
                log::debug!("No rows for series '{}' in {}", s.label, chart.title);
            }
            !s.points.is_empty()
        })
        .collect();

    Ok(ChartPlot {
        title: chart.title.clone(),
        x_label: chart.x_label.clone(),
        y_label: chart.y_label.clone(),
        size: chart.size,
        series,
    })
}

fn configured_groups(table: &Table, chart: &ResolvedChart) -> Vec<PlotSeries> {
    let fallback = generate_palette(chart.series.len());
    chart
        .series
        .iter()
        .zip(fallback)
        .map(|(style, fallback_color): (&ResolvedSeries, RGBColor)| {
            // Tags are configured as text, so numeric tag columns compare by
            // their display form.
            let rows = table
                .rows()
                .iter()
                .filter(|row| row.get(&chart.tag_column).to_string() == style.tag);
            PlotSeries {
                label: style.label.clone(),
                color: style.color.unwrap_or(fallback_color),
                line_width: style.line_width,
                marker: style.marker,
                points: series_points(rows, chart),
            }
        })
        .collect()
}

fn discovered_groups(table: &Table, chart: &ResolvedChart) -> Vec<PlotSeries> {
    let mut tags: Vec<&Value> = Vec::new();
    for row in table.rows() {
        let tag = row.get(&chart.tag_column);
        if !tags.iter().any(|t| t.matches(tag)) {
            tags.push(tag);
        }
    }

    let palette = generate_palette(tags.len());
    tags.into_iter()
        .zip(palette)
        .map(|(tag, color)| {
            let rows = table
                .rows()
                .iter()
                .filter(|row| row.get(&chart.tag_column).matches(tag));
            PlotSeries {
                label: tag.to_string(),
                color,
                line_width: 2,
                marker: false,
                points: series_points(rows, chart),
            }
        })
        .collect()
}

/// Numeric `(x, y)` pairs in row order. Cells that are not numbers, and NaN or
/// infinite readings, are left out of the line.
fn series_points<'a>(
    rows: impl Iterator<Item = &'a Row>,
    chart: &ResolvedChart,
) -> Vec<(f64, f64)> {
    rows.filter_map(|row| {
        let x = row.get(&chart.x_column);
        let y = row.get(&chart.y_column);
        match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => {
                log::debug!("Dropping non-numeric point ({x}, {y}) for {}", chart.title);
                None
            }
        }
    })
    .collect()
}
