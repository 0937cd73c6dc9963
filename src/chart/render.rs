use std::fs;
use std::path::Path;

use anyhow::Context;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::plot::ChartPlot;
use crate::error::ChartError;

const MARKER_RADIUS: u32 = 4;
const CAPTION_FONT_SIZE: u32 = 22;
const LABEL_FONT_SIZE: u32 = 16;

/// Draws a [`ChartPlot`] to a file.
pub trait Renderer {
    fn render(&self, plot: &ChartPlot, path: &Path) -> Result<(), ChartError>;
}

/// Create the parent directory of `path` if needed.
pub fn prepare_output(path: &Path) -> Result<(), ChartError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))
            .map_err(|source| ChartError::Render {
                path: path.to_path_buf(),
                source,
            }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// plotters renderer
// ---------------------------------------------------------------------------

/// Renders with plotters. `.svg` paths get the SVG backend; everything else
/// is rasterised and written as PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlottersRenderer;

impl Renderer for PlottersRenderer {
    fn render(&self, plot: &ChartPlot, path: &Path) -> Result<(), ChartError> {
        prepare_output(path)?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        let result = if is_svg {
            render_svg(plot, path)
        } else {
            render_png(plot, path)
        };
        result.map_err(|source| ChartError::Render {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn render_png(plot: &ChartPlot, path: &Path) -> anyhow::Result<()> {
    let (width, height) = plot.size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, plot.size).into_drawing_area();
        draw(plot, &root)?;
    }
    image::save_buffer_with_format(
        path,
        &buffer,
        width,
        height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("writing {}", path.display()))
}

fn render_svg(plot: &ChartPlot, path: &Path) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, plot.size).into_drawing_area();
    draw(plot, &root)
}

fn draw<DB>(plot: &ChartPlot, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&plot.title, ("sans-serif", CAPTION_FONT_SIZE))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(plot.x_range(), plot.y_range())?;

    chart
        .configure_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .axis_desc_style(("sans-serif", LABEL_FONT_SIZE))
        .draw()?;

    for series in &plot.series {
        let color = series.color;
        let width = series.line_width;
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(width),
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
            });

        if series.marker {
            chart.draw_series(
                series
                    .points
                    .iter()
                    .map(|&point| Circle::new(point, MARKER_RADIUS, color.filled())),
            )?;
        }
    }

    if !plot.series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", LABEL_FONT_SIZE))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
