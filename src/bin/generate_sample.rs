//! Writes a synthetic data set in the layout the built-in plan expects, so
//! `simplot` can be tried without running the simulations first.
//!
//! usage: generate_sample [DIR]   (default: sample_data)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SweepRecord {
    #[serde(rename = "Nodes")]
    nodes: u32,
    #[serde(rename = "NodeSpeed")]
    node_speed: u32,
    #[serde(rename = "Packet Transfer Rate(per s)")]
    packet_rate: u32,
    #[serde(rename = "Throughput")]
    throughput: f64,
    #[serde(rename = "End to End Delay")]
    delay: f64,
    #[serde(rename = "Packet Delivery Ratio")]
    delivery_ratio: f64,
    #[serde(rename = "Packet Drop Ratio")]
    drop_ratio: f64,
}

/// Parameter points of the three sweeps: vary one, hold the other two.
fn sweep_points() -> Vec<(u32, u32, u32)> {
    let mut points = Vec::new();
    for speed in [5, 10, 15, 20, 25] {
        points.push((70, speed, 300));
    }
    for nodes in [20, 40, 60, 80, 100] {
        points.push((nodes, 10, 300));
    }
    for rate in [100, 200, 300, 400, 500] {
        points.push((100, 20, rate));
    }
    points
}

/// `reliable` shifts the numbers the way a reverse-path-aware AODV would.
fn sweep_record(nodes: u32, node_speed: u32, packet_rate: u32, reliable: bool) -> SweepRecord {
    let load = f64::from(nodes) * f64::from(packet_rate) / 30_000.0;
    let mobility = f64::from(node_speed) / 25.0;
    let bonus = if reliable { 0.06 } else { 0.0 };

    let delivery_ratio = 0.97 - 0.25 * mobility - 0.08 * load + bonus;
    let delivery_ratio = delivery_ratio.clamp(0.05, 0.999);
    let throughput = f64::from(packet_rate) * 512.0 * 8.0 * delivery_ratio / 1000.0;
    let delay = 0.012 + 0.04 * load + 0.03 * mobility - bonus * 0.1;

    SweepRecord {
        nodes,
        node_speed,
        packet_rate,
        throughput: round(throughput, 3),
        delay: round(delay, 5),
        delivery_ratio: round(delivery_ratio * 100.0, 3),
        drop_ratio: round((1.0 - delivery_ratio) * 100.0, 3),
    }
}

fn write_sweep(path: &Path, reliable: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (nodes, speed, rate) in sweep_points() {
        writer.serialize(sweep_record(nodes, speed, rate, reliable))?;
    }
    writer.flush()?;
    Ok(())
}

const TRACE_METRICS: [&str; 7] = [
    "cwnd", "ssth", "rtt", "rto", "next-tx", "inflight", "next-rx",
];
const SEGMENT: f64 = 536.0;

/// A Scalable-TCP-like sawtooth: multiplicative increase of 1% per step,
/// back-off by 1/8 on a loss every `period` steps.
fn cwnd_trace(steps: usize, period: usize, flow: usize) -> Vec<f64> {
    let mut cwnd = SEGMENT;
    (0..steps)
        .map(|i| {
            if i > 0 && (i + flow * 7) % period == 0 {
                cwnd *= 0.875;
            } else {
                cwnd += (cwnd * 0.01).max(SEGMENT / 4.0);
            }
            cwnd.round()
        })
        .collect()
}

fn trace_value(metric: &str, cwnd: &[f64], step: usize, flow: usize) -> f64 {
    let wobble = ((step as f64) * 0.37 + flow as f64).sin();
    match metric {
        "cwnd" => cwnd[step],
        "ssth" => cwnd[..=step].iter().copied().fold(SEGMENT, f64::max) * 0.875,
        "rtt" => 0.1 + 0.01 * wobble.abs() + cwnd[step] / 5.0e6,
        "rto" => 0.2 + 0.02 * wobble.abs(),
        "inflight" => (cwnd[step] * (0.9 + 0.1 * wobble)).round(),
        "next-tx" | "next-rx" => cwnd[..=step].iter().sum::<f64>().round() + 1.0,
        _ => 0.0,
    }
}

fn write_trace(path: &Path, metric: &str, cwnd: &[f64], flow: usize) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for step in 0..cwnd.len() {
        let time = step as f64 * 0.1;
        writeln!(out, "{time:.1} {}", trace_value(metric, cwnd, step, flow))?;
    }
    out.flush()?;
    Ok(())
}

fn round(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data".to_string());
    let dir = Path::new(&dir);
    fs::create_dir_all(dir)
        .with_context(|| format!("creating {}", dir.display()))?;

    write_sweep(&dir.join("output_result_aodv.csv"), false)?;
    write_sweep(&dir.join("output_result.csv"), true)?;

    let variants = [
        ("TcpVariantsComparisonTcpScalable", 40),
        ("TwTcpVariantsComparisonTcpScalable", 55),
    ];
    let mut files = 2;
    for (prefix, period) in variants {
        for flow in 0..2 {
            let cwnd = cwnd_trace(200, period, flow);
            for metric in TRACE_METRICS {
                let path = dir.join(format!("{prefix}-flow{flow}-{metric}.data"));
                write_trace(&path, metric, &cwnd, flow)?;
                files += 1;
            }
        }
    }

    println!("Wrote {files} sample files to {}", dir.display());
    Ok(())
}
