use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::config::{OutputFormat, ReportConfig};

pub const USAGE: &str = "\
Usage:
  popsynth-report hist <samples.txt> [--bin-type lin|log|ln] [--norm none|max|prob] [--bins N] [--no-edges] [--json]
  popsynth-report interval <k>... [--sigma S] [--exposure T] [--json]
  popsynth-report rates <rates.json> [--no-scale-area] [--json]";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Bin a whitespace/comma separated sample file
    Hist { path: PathBuf },
    /// Poisson intervals for observed counts
    Interval { counts: Vec<u64> },
    /// Render (and optionally area-scale) a saved rate counter
    Rates { path: PathBuf },
}

/// Parse command-line arguments (without the program name). Flags override
/// whatever `config` was loaded from the environment.
pub fn parse_args(args: &[String], config: &mut ReportConfig) -> Result<Command> {
    let mut positional: Vec<&str> = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--bin-type" => {
                let v = flag_value(&mut iter, arg)?;
                config.bin_type = v.parse().context("Invalid --bin-type")?;
            }
            "--norm" => {
                let v = flag_value(&mut iter, arg)?;
                config.norm = v.parse().context("Invalid --norm")?;
            }
            "--bins" => {
                let v = flag_value(&mut iter, arg)?;
                config.bins = Some(v.parse().context("Invalid --bins")?);
            }
            "--sigma" => {
                let v = flag_value(&mut iter, arg)?;
                config.sigma = v.parse().context("Invalid --sigma")?;
            }
            "--exposure" => {
                let v = flag_value(&mut iter, arg)?;
                config.exposure = Some(v.parse().context("Invalid --exposure")?);
            }
            "--no-edges" => config.edges = false,
            "--no-scale-area" => config.scale_area = false,
            "--json" => config.output = OutputFormat::Json,
            flag if flag.starts_with("--") => bail!("Unknown flag '{}'\n{}", flag, USAGE),
            value => positional.push(value),
        }
    }

    config.validate()?;

    let (command, rest) = match positional.split_first() {
        Some((command, rest)) => (*command, rest),
        None => bail!("Missing command\n{}", USAGE),
    };

    match command {
        "hist" => Ok(Command::Hist {
            path: single_path(rest, command)?,
        }),
        "interval" => {
            if rest.is_empty() {
                bail!("'interval' needs at least one count\n{}", USAGE);
            }
            let counts = rest
                .iter()
                .map(|k| {
                    k.parse::<u64>()
                        .with_context(|| format!("Counts must be non-negative integers, got '{k}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Command::Interval { counts })
        }
        "rates" => Ok(Command::Rates {
            path: single_path(rest, command)?,
        }),
        other => bail!("Unknown command '{}'\n{}", other, USAGE),
    }
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(|s| s.as_str())
        .with_context(|| format!("{flag} needs a value"))
}

fn single_path(rest: &[&str], command: &str) -> Result<PathBuf> {
    match rest {
        [path] => Ok(PathBuf::from(*path)),
        _ => bail!("'{}' takes exactly one file\n{}", command, USAGE),
    }
}
