//! popsynth-report: command-line front end for survey post-processing.
//!
//! Bins parameter samples, prints Poisson intervals for observed counts and
//! renders per-survey rate tables.
//!
//! Usage:
//!   cargo run -p popsynth-report -- hist dm.txt --bin-type log --norm prob
//!   cargo run -p popsynth-report -- interval 0 3 10 --sigma 2
//!   cargo run -p popsynth-report -- interval 3 --exposure 14    # bursts/hour
//!   cargo run -p popsynth-report -- rates htru.json --json

use anyhow::Result;

mod cli;
mod config;
mod report;

use config::ReportConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "popsynth_report=info,popsynth_stats=warn,popsynth_rates=warn".into());
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // Logs go to stderr so stdout stays clean for tables and JSON
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = ReportConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = cli::parse_args(&args, &mut config)?;
    tracing::debug!(?command, ?config, "Parsed arguments");

    let output = report::run(&command, &config)?;
    print!("{output}");

    Ok(())
}
