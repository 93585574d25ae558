use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyzer::config;
use analyzer::loader::{self, InputFormat};
use analyzer::sample::{self, SampleOptions};

mod cli;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_tracing(args.log_json);

    let result = match args.command {
        cli::Commands::Analyze {
            input,
            config,
            output,
            compact,
            jsonl,
        } => run_analyze(&input, config.as_deref(), output.as_deref(), compact, jsonl),
        cli::Commands::Generate {
            count,
            seed,
            output,
        } => run_generate(count, seed, output),
        cli::Commands::Config { config } => print_config(config.as_deref()),
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "analyzer=info,apilog=info".into()),
    );

    let (plain, structured) = if json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}

fn run_analyze(
    input: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
    jsonl: bool,
) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;

    let format = if jsonl {
        InputFormat::JsonLines
    } else {
        InputFormat::from_path(input)
    };
    let doc = loader::load(input, format)
        .with_context(|| format!("failed to load logs from {}", input.display()))?;

    let report = analyzer::analyze_json(&doc, &cfg)?;
    write_json(&report, output, compact)
}

fn run_generate(count: usize, seed: u64, output: Option<PathBuf>) -> anyhow::Result<()> {
    let records = sample::generate(&SampleOptions {
        count,
        seed,
        ..Default::default()
    });
    tracing::info!(count = records.len(), seed, "generated sample logs");
    write_json(&records, output.as_deref(), false)
}

fn print_config(config_path: Option<&Path>) -> anyhow::Result<()> {
    let cfg = config::load(config_path)?;
    let yaml = serde_yaml::to_string(&cfg).context("failed to render config")?;
    print!("{}", yaml);
    Ok(())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>, compact: bool) -> anyhow::Result<()> {
    let mut body = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    body.push('\n');

    match output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(body.as_bytes())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}
