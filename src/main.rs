use std::path::Path;

use anyhow::{bail, Result};

use simplot::chart::render::PlottersRenderer;
use simplot::config::Config;
use simplot::runner;

const USAGE: &str = "usage: simplot [PLAN.json | --dump-plan]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.as_slice() {
        [] => Config::builtin(),
        [flag] if flag == "--dump-plan" => {
            println!("{}", serde_json::to_string_pretty(&Config::builtin())?);
            return Ok(());
        }
        [flag] if flag == "-h" || flag == "--help" => {
            println!("{USAGE}");
            return Ok(());
        }
        [plan] => Config::from_file(Path::new(plan))?,
        _ => bail!("{USAGE}"),
    };

    log::info!(
        "Running {} chart jobs (input: {}, output: {})",
        config.jobs.len(),
        config.input_dir.display(),
        config.output_dir.display()
    );
    let report = runner::run(&config, &PlottersRenderer);
    log::info!(
        "{} charts written, {} skipped",
        report.rendered.len(),
        report.skipped.len()
    );
    Ok(())
}
