use std::error::Error as _;
use std::path::PathBuf;

use log::{error, info, warn};

use crate::chart::job::{ChartJob, ResolvedChart, ResolvedSource};
use crate::chart::plot::build_plot;
use crate::chart::render::Renderer;
use crate::config::Config;
use crate::data::loader::load_table;
use crate::data::model::Table;
use crate::error::{ChartError, SkipReason};

/// A chart that was not produced, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub job: String,
    pub metric: String,
    pub reason: SkipReason,
    pub message: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub rendered: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

/// Tables of the last resolved source list, reused while a job's metrics
/// read the same files.
type TableCache = Option<(Vec<ResolvedSource>, Table)>;

/// Produce every chart of every job, one at a time. A failing chart is
/// logged and recorded; it never stops the run.
pub fn run(config: &Config, renderer: &dyn Renderer) -> RunReport {
    let mut report = RunReport::default();

    for job in &config.jobs {
        let mut cache: TableCache = None;
        for metric in &job.metrics {
            match run_chart(config, job, metric, renderer, &mut cache) {
                Ok(path) => {
                    info!("Plot saved: {}", path.display());
                    report.rendered.push(path);
                }
                Err(err) => {
                    let skipped = Skipped {
                        job: job.name.clone(),
                        metric: metric.clone(),
                        reason: err.reason(),
                        message: error_chain(&err),
                    };
                    log_skip(&skipped);
                    report.skipped.push(skipped);
                }
            }
        }
    }

    report
}

fn run_chart(
    config: &Config,
    job: &ChartJob,
    metric: &str,
    renderer: &dyn Renderer,
    cache: &mut TableCache,
) -> Result<PathBuf, ChartError> {
    let chart = job.resolve(metric, &config.input_dir, &config.output_dir)?;
    let combined = cached_sources(cache, &chart)?;

    let filtered = chart.filter.apply(combined)?;
    if filtered.is_empty() {
        warn!(
            "No rows match the filter for '{}' ({}); writing an empty chart",
            job.name, metric
        );
    }

    let plot = build_plot(&filtered, &chart)?;
    renderer.render(&plot, &chart.output)?;
    Ok(chart.output)
}

fn cached_sources<'c>(
    cache: &'c mut TableCache,
    chart: &ResolvedChart,
) -> Result<&'c Table, ChartError> {
    let entry = match cache.take() {
        Some((sources, table)) if sources == chart.sources => (sources, table),
        _ => (chart.sources.clone(), load_sources(chart)?),
    };
    Ok(&cache.insert(entry).1)
}

/// Load every source, tag it, and append them in order.
fn load_sources(chart: &ResolvedChart) -> Result<Table, ChartError> {
    let mut tables = Vec::with_capacity(chart.sources.len());
    for source in &chart.sources {
        let table = load_table(&source.path, &source.format)?;
        info!("Loaded {} rows from {}", table.len(), source.path.display());
        tables.push(match &source.tag {
            Some(tag) => table.with_tag(&chart.tag_column, tag.as_str()),
            None => table,
        });
    }
    Ok(Table::concat(tables))
}

fn log_skip(skipped: &Skipped) {
    let Skipped {
        job,
        metric,
        reason,
        message,
    } = skipped;
    match reason {
        SkipReason::Missing => warn!("Skipping '{job}' ({metric}): {message}"),
        SkipReason::Empty => warn!("Empty data for '{job}' ({metric}): {message}"),
        SkipReason::Malformed => {
            error!("Error reading data files for '{job}' ({metric}): {message}")
        }
        SkipReason::Other => error!("Unexpected error for '{job}' ({metric}): {message}"),
    }
}

/// The error message followed by each of its causes.
fn error_chain(err: &ChartError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::chart::job::{SeriesSpec, SourceSpec};
    use crate::chart::plot::ChartPlot;
    use crate::chart::render::prepare_output;
    use crate::data::filter::FilterPredicate;
    use crate::data::loader::TableFormat;

    /// Writes the chart title to the target and keeps the plot for inspection.
    #[derive(Default)]
    struct RecordingRenderer {
        plots: RefCell<Vec<(PathBuf, ChartPlot)>>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&self, plot: &ChartPlot, path: &Path) -> Result<(), ChartError> {
            prepare_output(path)?;
            fs::write(path, plot.title.as_bytes()).map_err(|e| ChartError::Render {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            self.plots
                .borrow_mut()
                .push((path.to_path_buf(), plot.clone()));
            Ok(())
        }
    }

    fn write_sweeps(dir: &Path) {
        fs::write(
            dir.join("output_result_aodv.csv"),
            "Nodes,NodeSpeed,Packet Transfer Rate(per s),Throughput\n\
             70,5,300,10.5\n\
             100,5,300,99\n\
             70,10,300,11.5\n",
        )
        .unwrap();
        fs::write(
            dir.join("output_result.csv"),
            "Nodes,NodeSpeed,Packet Transfer Rate(per s),Throughput\n\
             70,5,300,12\n\
             70,10,300,13\n\
             100,10,300,98\n",
        )
        .unwrap();
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn series(tag: &str, color: &str) -> SeriesSpec {
        SeriesSpec {
            tag: tag.into(),
            label: None,
            color: Some(color.into()),
            line_width: 2,
            marker: true,
        }
    }

    fn sweep_job(filter: FilterPredicate) -> ChartJob {
        ChartJob {
            name: "node-speed".into(),
            sources: vec![
                SourceSpec {
                    path: "output_result_aodv.csv".into(),
                    tag: Some("AODV".into()),
                    format: TableFormat::csv(),
                },
                SourceSpec {
                    path: "output_result.csv".into(),
                    tag: Some("RAODV".into()),
                    format: TableFormat::csv(),
                },
            ],
            tag_column: "Protocol".into(),
            filter,
            x_column: "NodeSpeed".into(),
            y_column: "{metric}".into(),
            metrics: vec!["Throughput".into()],
            title: "{metric} vs Node Speed (Nodes={Nodes})".into(),
            x_label: "Node Speed".into(),
            y_label: "{metric}".into(),
            output: "graphs_set1/{metric}_vs_NodeSpeed_{Nodes}.png".into(),
            series: vec![series("AODV", "blue"), series("RAODV", "green")],
            size: (800, 600),
        }
    }

    fn config(dir: &Path, jobs: Vec<ChartJob>) -> Config {
        Config {
            input_dir: dir.to_path_buf(),
            output_dir: dir.join("plots"),
            jobs,
        }
    }

    #[test]
    fn fixed_filter_excludes_other_node_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_sweeps(dir.path());
        let job = sweep_job(FilterPredicate::new().with("Nodes", 70));
        let renderer = RecordingRenderer::default();

        let report = run(&config(dir.path(), vec![job]), &renderer);

        let plots_dir = dir.path().join("plots");
        let expected = plots_dir.join("graphs_set1/Throughput_vs_NodeSpeed_70.png");
        assert_eq!(report.rendered, [expected.clone()]);
        assert!(report.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(&expected).unwrap(),
            "Throughput vs Node Speed (Nodes=70)"
        );

        let plots = renderer.plots.borrow();
        let plot = &plots[0].1;
        assert_eq!(plot.series[0].label, "AODV");
        assert_eq!(plot.series[0].points, [(5.0, 10.5), (10.0, 11.5)]);
        assert_eq!(plot.series[1].label, "RAODV");
        assert_eq!(plot.series[1].points, [(5.0, 12.0), (10.0, 13.0)]);
    }

    #[test]
    fn zero_matching_rows_still_write_a_file() {
        let dir = tempfile::tempdir().unwrap();
        write_sweeps(dir.path());
        let job = sweep_job(FilterPredicate::new().with("Nodes", 20));
        let renderer = RecordingRenderer::default();

        let report = run(&config(dir.path(), vec![job]), &renderer);

        assert_eq!(report.rendered.len(), 1);
        assert!(report.rendered[0].is_file());
        assert!(renderer.plots.borrow()[0].1.series.is_empty());
    }

    #[test]
    fn missing_input_skips_only_its_chart() {
        let dir = tempfile::tempdir().unwrap();
        write_sweeps(dir.path());
        let mut broken = sweep_job(FilterPredicate::new().with("Nodes", 70));
        broken.name = "broken".into();
        broken.sources[1].path = "does_not_exist.csv".into();
        let healthy = sweep_job(FilterPredicate::new().with("Nodes", 100));
        let renderer = RecordingRenderer::default();

        let report = run(&config(dir.path(), vec![broken, healthy]), &renderer);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].job, "broken");
        assert_eq!(report.skipped[0].reason, SkipReason::Missing);
        assert!(report.skipped[0].message.contains("does_not_exist.csv"));
        assert_eq!(report.rendered.len(), 1);
    }

    #[test]
    fn empty_and_malformed_inputs_are_classified() {
        let dir = tempfile::tempdir().unwrap();
        write_sweeps(dir.path());
        write(dir.path(), "empty.csv", "");
        write(dir.path(), "ragged.csv", "Nodes,NodeSpeed\n70,5,1\n");

        let plain = |filter: FilterPredicate| ChartJob {
            title: "{metric}".into(),
            output: "{metric}.png".into(),
            ..sweep_job(filter)
        };
        let mut empty = plain(FilterPredicate::new());
        empty.sources[0].path = "empty.csv".into();
        let mut ragged = plain(FilterPredicate::new());
        ragged.sources[0].path = "ragged.csv".into();
        let unknown = plain(FilterPredicate::new().with("Speed", 10));

        let report = run(
            &config(dir.path(), vec![empty, ragged, unknown]),
            &RecordingRenderer::default(),
        );

        use SkipReason::{Empty, Malformed, Other};
        let reasons: Vec<SkipReason> = report.skipped.iter().map(|s| s.reason).collect();
        assert_eq!(reasons, [Empty, Malformed, Other]);
        assert!(report.rendered.is_empty());
    }

    #[test]
    fn rerun_writes_the_same_paths() {
        let dir = tempfile::tempdir().unwrap();
        write_sweeps(dir.path());
        let job = sweep_job(FilterPredicate::new().with("Nodes", 70));
        let plan = config(dir.path(), vec![job]);

        let first = run(&plan, &RecordingRenderer::default());
        let second = run(&plan, &RecordingRenderer::default());
        assert_eq!(first.rendered, second.rendered);
    }

    #[test]
    fn flow_traces_become_one_series_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "A-cwnd.data", "0.0 10\n0.1 12\n");
        write(dir.path(), "B-cwnd.data", "0.0 8\n0.1 9\n");
        write(dir.path(), "A-rtt.data", "0.0 0.2\n");

        let trace = |tag: &str| SourceSpec {
            path: format!("{tag}-{{metric}}.data"),
            tag: Some(tag.to_string()),
            format: TableFormat::whitespace(vec!["Time".into(), "{METRIC}".into()]),
        };
        let job = ChartJob {
            name: "flows".into(),
            sources: vec![trace("A"), trace("B")],
            tag_column: "Flow".into(),
            filter: FilterPredicate::new(),
            x_column: "Time".into(),
            y_column: "{METRIC}".into(),
            metrics: vec!["cwnd".into(), "rtt".into()],
            title: "{METRIC} Over Time".into(),
            x_label: "Time (s)".into(),
            y_label: "{METRIC}".into(),
            output: "Flows_{METRIC}.png".into(),
            series: Vec::new(),
            size: (1200, 600),
        };
        let renderer = RecordingRenderer::default();

        let report = run(&config(dir.path(), vec![job]), &renderer);

        assert_eq!(report.rendered, [dir.path().join("plots/Flows_CWND.png")]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].metric, "rtt");
        assert_eq!(report.skipped[0].reason, SkipReason::Missing);

        let plots = renderer.plots.borrow();
        let plot = &plots[0].1;
        let labels: Vec<&str> = plot.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["A", "B"]);
        assert!(plot.series.iter().all(|s| s.points.len() == 2));
    }

    #[test]
    fn sources_are_reused_across_metrics() {
        let dir = tempfile::tempdir().unwrap();
        write_sweeps(dir.path());
        let job = sweep_job(FilterPredicate::new().with("Nodes", 70));
        let chart = job.resolve("Throughput", dir.path(), dir.path()).unwrap();

        let mut cache: TableCache = None;
        let first = cached_sources(&mut cache, &chart).unwrap().len();
        let raodv = dir.path().join("output_result.csv");
        fs::remove_file(raodv).unwrap();
        let second = cached_sources(&mut cache, &chart).unwrap().len();
        assert_eq!(first, 6);
        assert_eq!(second, 6);
    }
}
