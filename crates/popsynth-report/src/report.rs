use anyhow::{Context, Result};
use popsynth_core::{Histogram, PoissonInterval};
use popsynth_rates::{scale, RateCounter};
use popsynth_stats::{hist, BinOptions, PoissonEstimator};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::cli::Command;
use crate::config::{OutputFormat, ReportConfig};

#[derive(Debug, Serialize)]
struct IntervalRow {
    k: u64,
    low: f64,
    high: f64,
}

/// Run a command and return what should be printed.
pub fn run(command: &Command, config: &ReportConfig) -> Result<String> {
    match command {
        Command::Hist { path } => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read sample file {}", path.display()))?;
            let sample = parse_sample(&raw)
                .with_context(|| format!("Failed to parse sample file {}", path.display()))?;
            render_histogram(&sample, config)
        }
        Command::Interval { counts } => render_intervals(counts, config),
        Command::Rates { path } => {
            let rates = load_rates(path)?;
            render_rates(&rates, config)
        }
    }
}

/// Parse floats separated by whitespace and/or commas. Lines starting with
/// `#` are comments. `nan` and `inf` are accepted and later filtered by binning.
pub fn parse_sample(raw: &str) -> Result<Vec<f64>> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("Not a number: '{token}'"))
        })
        .collect()
}

pub fn render_histogram(sample: &[f64], config: &ReportConfig) -> Result<String> {
    let opts = BinOptions {
        bin_type: config.bin_type,
        bins: config.bins,
        norm: config.norm,
        edges: config.edges,
        bin_edges: None,
    };
    let histogram = hist(sample, &opts)?;

    if histogram.is_no_data() {
        tracing::warn!("Sample contains no finite values; nothing to bin");
    } else {
        tracing::info!(
            samples = sample.len(),
            bins = histogram.len(),
            bin_type = %config.bin_type,
            norm = %config.norm,
            "Binned sample"
        );
    }

    match config.output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&histogram)? + "\n"),
        OutputFormat::Table => Ok(histogram_table(&histogram)),
    }
}

fn histogram_table(histogram: &Histogram) -> String {
    let mut out = format!("{:>16} {:>16}\n", "center", "value");
    for (center, value) in histogram.iter() {
        let _ = writeln!(out, "{:>16.6e} {:>16.6}", center, value);
    }
    out
}

pub fn render_intervals(counts: &[u64], config: &ReportConfig) -> Result<String> {
    let estimator = PoissonEstimator::new(config.sigma)?;
    let intervals: Vec<PoissonInterval> = match config.exposure {
        Some(exposure) => counts
            .iter()
            .map(|&k| estimator.rate_interval(k, exposure))
            .collect::<Result<_, _>>()?,
        None => estimator.intervals(counts)?,
    };

    tracing::info!(
        sigma = config.sigma,
        counts = counts.len(),
        exposure = ?config.exposure,
        "Computed Poisson intervals"
    );

    let rows: Vec<IntervalRow> = counts
        .iter()
        .zip(intervals.iter())
        .map(|(&k, interval)| IntervalRow {
            k,
            low: interval.low,
            high: interval.high,
        })
        .collect();

    match config.output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)? + "\n"),
        OutputFormat::Table => {
            let mut out = format!("{:>10} {:>14} {:>14}\n", "k", "low", "high");
            for row in &rows {
                let _ = writeln!(out, "{:>10} {:>14.6} {:>14.6}", row.k, row.low, row.high);
            }
            Ok(out)
        }
    }
}

pub fn load_rates(path: &Path) -> Result<RateCounter> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rates file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse rates file {}", path.display()))
}

pub fn render_rates(rates: &RateCounter, config: &ReportConfig) -> Result<String> {
    let rates = if config.scale_area && !rates.scaled_area() {
        scale(rates, true)?
    } else {
        if config.scale_area {
            tracing::info!(survey = rates.name(), "Rates already area-scaled, leaving as-is");
        }
        rates.clone()
    };

    match config.output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rates)? + "\n"),
        OutputFormat::Table => Ok(rates.render()),
    }
}
