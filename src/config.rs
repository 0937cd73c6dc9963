use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chart::job::{ChartJob, SeriesSpec, SourceSpec};
use crate::data::filter::FilterPredicate;
use crate::data::loader::TableFormat;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// A plan: where to read, where to write, and which charts to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "current_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "current_dir")]
    pub output_dir: PathBuf,
    pub jobs: Vec<ChartJob>,
}

fn current_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Read a JSON plan file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading plan {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing plan {}", path.display()))
    }

    /// The charts produced for the AODV/RAODV sweeps and the TcpScalable
    /// trace comparisons, reading from and writing to the working directory.
    pub fn builtin() -> Self {
        let mut jobs = routing_sweeps();
        jobs.extend(tcp_scalable_traces());
        Config {
            input_dir: current_dir(),
            output_dir: current_dir(),
            jobs,
        }
    }
}

// ---------------------------------------------------------------------------
// AODV vs RAODV parameter sweeps
// ---------------------------------------------------------------------------

const NODES: &str = "Nodes";
const SPEED: &str = "NodeSpeed";
const RATE: &str = "Packet Transfer Rate(per s)";

const ROUTING_METRICS: [&str; 4] = [
    "Throughput",
    "End to End Delay",
    "Packet Delivery Ratio",
    "Packet Drop Ratio",
];

fn routing_sweeps() -> Vec<ChartJob> {
    vec![
        sweep(
            "node-speed",
            FilterPredicate::new().with(NODES, 70).with(RATE, 300),
            SPEED,
            "Node Speed",
            "{metric} vs Node Speed (Nodes={Nodes}, Packet Rate={Packet Transfer Rate(per s)})",
            "graphs_set1/{metric}_vs_NodeSpeed_{Nodes}_{Packet Transfer Rate(per s)}.png",
        ),
        sweep(
            "node-size",
            FilterPredicate::new().with(SPEED, 10).with(RATE, 300),
            NODES,
            "Node Size",
            "{metric} vs Node Size (Packet Rate={Packet Transfer Rate(per s)}, Speed={NodeSpeed})",
            "graphs_set2/{metric}_vs_NodeSize_{Packet Transfer Rate(per s)}_{NodeSpeed}.png",
        ),
        sweep(
            "packet-rate",
            FilterPredicate::new().with(NODES, 100).with(SPEED, 20),
            RATE,
            "Packet Transfer Rate (per s)",
            "{metric} vs Packet Rate (Nodes={Nodes}, Speed={NodeSpeed})",
            "graphs_set3/{metric}_vs_PacketRate_{Nodes}_{NodeSpeed}.png",
        ),
    ]
}

/// One AODV vs RAODV comparison per metric, with the other sweep parameters
/// held fixed by `filter`.
fn sweep(
    name: &str,
    filter: FilterPredicate,
    x_column: &str,
    x_label: &str,
    title: &str,
    output: &str,
) -> ChartJob {
    ChartJob {
        name: name.to_string(),
        sources: vec![
            csv_source("output_result_aodv.csv", "AODV"),
            csv_source("output_result.csv", "RAODV"),
        ],
        tag_column: "Protocol".to_string(),
        filter,
        x_column: x_column.to_string(),
        y_column: "{metric}".to_string(),
        metrics: ROUTING_METRICS.iter().map(|m| m.to_string()).collect(),
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: "{metric}".to_string(),
        output: output.to_string(),
        series: vec![
            marked_series("AODV", "blue"),
            marked_series("RAODV", "green"),
        ],
        size: (800, 600),
    }
}

fn csv_source(path: &str, tag: &str) -> SourceSpec {
    SourceSpec {
        path: path.to_string(),
        tag: Some(tag.to_string()),
        format: TableFormat::csv(),
    }
}

fn marked_series(tag: &str, color: &str) -> SeriesSpec {
    SeriesSpec {
        tag: tag.to_string(),
        label: None,
        color: Some(color.to_string()),
        line_width: 2,
        marker: true,
    }
}

// ---------------------------------------------------------------------------
// TcpScalable trace files
// ---------------------------------------------------------------------------

/// Trace extensions written by the ns-3 TCP variants example.
const TRACE_METRICS: [&str; 7] = [
    "cwnd", "ssth", "rtt", "rto", "next-tx", "inflight", "next-rx",
];

const STOCK_PREFIX: &str = "TcpVariantsComparisonTcpScalable";
const TWEAKED_PREFIX: &str = "TwTcpVariantsComparisonTcpScalable";

fn tcp_scalable_traces() -> Vec<ChartJob> {
    vec![
        trace(
            "tcp-scalable",
            vec![
                trace_source(STOCK_PREFIX, 0, "stock-flow0"),
                trace_source(STOCK_PREFIX, 1, "stock-flow1"),
            ],
            vec![
                flow_series("stock-flow1", "Flow 1", "red", 3),
                flow_series("stock-flow0", "Flow 0", "black", 2),
            ],
            "TCP Variants(TcpScalable): {METRIC} Over Time",
            "TcpScalable_{METRIC}.png",
        ),
        trace(
            "tcp-scalable-comparison",
            vec![
                trace_source(STOCK_PREFIX, 0, "stock-flow0"),
                trace_source(STOCK_PREFIX, 1, "stock-flow1"),
                trace_source(TWEAKED_PREFIX, 0, "tweak-flow0"),
                trace_source(TWEAKED_PREFIX, 1, "tweak-flow1"),
            ],
            vec![
                flow_series("stock-flow1", "TcpScalable Flow 1", "red", 3),
                flow_series("stock-flow0", "TcpScalable Flow 0", "black", 2),
                flow_series("tweak-flow1", "TweakTcpScalable Flow 1", "blue", 3),
                flow_series("tweak-flow0", "TweakTcpScalable Flow 0", "green", 2),
            ],
            "Comparison of TcpScalable vs TweakTcpScalable: {METRIC} Over Time",
            "Comparison_{METRIC}_Comparison.png",
        ),
    ]
}

/// Per-flow time series of every trace metric.
fn trace(
    name: &str,
    sources: Vec<SourceSpec>,
    series: Vec<SeriesSpec>,
    title: &str,
    output: &str,
) -> ChartJob {
    ChartJob {
        name: name.to_string(),
        sources,
        tag_column: "Flow".to_string(),
        filter: FilterPredicate::new(),
        x_column: "Time".to_string(),
        y_column: "{METRIC}".to_string(),
        metrics: TRACE_METRICS.iter().map(|m| m.to_string()).collect(),
        title: title.to_string(),
        x_label: "Time (s)".to_string(),
        y_label: "{METRIC}".to_string(),
        output: output.to_string(),
        series,
        size: (1200, 600),
    }
}

fn trace_source(prefix: &str, flow: u32, tag: &str) -> SourceSpec {
    SourceSpec {
        path: format!("{prefix}-flow{flow}-{{metric}}.data"),
        tag: Some(tag.to_string()),
        format: TableFormat::whitespace(vec!["Time".to_string(), "{METRIC}".to_string()]),
    }
}

/// `label` is followed by the metric name in the legend.
fn flow_series(tag: &str, label: &str, color: &str, line_width: u32) -> SeriesSpec {
    SeriesSpec {
        tag: tag.to_string(),
        label: Some(format!("{label} {{metric}}")),
        color: Some(color.to_string()),
        line_width,
        marker: false,
    }
}
