mod config;
mod models;
mod notify;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use config::{Config, SystemEnv};

const USAGE: &str = "Usage: reportbot [REPORT_PATH] [--config <file>] [--dry-run] [--strict]";

#[derive(Debug, Default, PartialEq)]
struct Cli {
    report: Option<PathBuf>,
    config: Option<PathBuf>,
    /// Print the card instead of sending it.
    dry_run: bool,
    /// Exit non-zero when the notification could not be delivered.
    strict: bool,
    help: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reportbot=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_cli(std::env::args().skip(1))?;
    if cli.help {
        eprintln!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    run(cli)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::load(&cwd)?
        }
    }
    .with_env(&SystemEnv);

    let delivery = config.delivery().context("invalid notification settings")?;
    let report_path = cli.report.unwrap_or_else(|| config.report_path());

    let summary = report::extract(&report_path);

    if cli.dry_run {
        let message = notify::message(&summary, &delivery);
        let json =
            serde_json::to_string_pretty(&message).context("failed to serialize message")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    let delivered = notify::publish(&summary, &delivery);
    if !delivered && cli.strict {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_cli(args: impl IntoIterator<Item = String>) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--dry-run" => cli.dry_run = true,
            "--strict" => cli.strict = true,
            "-c" | "--config" => {
                let path = args.next().context("missing value for --config")?;
                cli.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => cli.help = true,
            flag if flag.starts_with('-') => anyhow::bail!("unknown flag: {flag}\n{USAGE}"),
            _ if cli.report.is_some() => anyhow::bail!("unexpected argument: {a}\n{USAGE}"),
            _ => cli.report = Some(PathBuf::from(&a)),
        }
    }
    Ok(cli)
}
