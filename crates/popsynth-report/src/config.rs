use anyhow::{bail, Context, Result};
use popsynth_core::{BinType, Normalization};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    // Binning
    pub bin_type: BinType,        // lin
    pub norm: Normalization,      // max
    pub bins: Option<usize>,      // unset = adaptive
    pub edges: bool,              // pad histograms with empty end bins

    // Poisson intervals
    pub sigma: f64,               // 1.0
    pub exposure: Option<f64>,    // divide intervals into rates when set

    // Rates
    pub scale_area: bool,         // true

    pub output: OutputFormat,     // table
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bin_type: BinType::Linear,
            norm: Normalization::Max,
            bins: None,
            edges: true,
            sigma: 1.0,
            exposure: None,
            scale_area: true,
            output: OutputFormat::Table,
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            bin_type: match lookup("POPSYNTH_BIN_TYPE") {
                Some(v) => v.parse().context("Invalid POPSYNTH_BIN_TYPE")?,
                None => defaults.bin_type,
            },
            norm: match lookup("POPSYNTH_NORM") {
                Some(v) => v.parse().context("Invalid POPSYNTH_NORM")?,
                None => defaults.norm,
            },
            bins: match lookup("POPSYNTH_BINS") {
                Some(v) => Some(v.trim().parse().context("Invalid POPSYNTH_BINS")?),
                None => defaults.bins,
            },
            edges: match lookup("POPSYNTH_EDGES") {
                Some(v) => parse_bool(&v).context("Invalid POPSYNTH_EDGES")?,
                None => defaults.edges,
            },
            sigma: match lookup("POPSYNTH_SIGMA") {
                Some(v) => v.trim().parse().context("Invalid POPSYNTH_SIGMA")?,
                None => defaults.sigma,
            },
            exposure: match lookup("POPSYNTH_EXPOSURE") {
                Some(v) => Some(v.trim().parse().context("Invalid POPSYNTH_EXPOSURE")?),
                None => defaults.exposure,
            },
            scale_area: match lookup("POPSYNTH_SCALE_AREA") {
                Some(v) => parse_bool(&v).context("Invalid POPSYNTH_SCALE_AREA")?,
                None => defaults.scale_area,
            },
            output: match lookup("POPSYNTH_OUTPUT") {
                Some(v) => parse_output(&v)?,
                None => defaults.output,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            bail!("sigma must be a positive number, got {}", self.sigma);
        }
        if self.bins == Some(0) {
            bail!("bin count must be at least 1");
        }
        if let Some(exposure) = self.exposure {
            if !exposure.is_finite() || exposure <= 0.0 {
                bail!("exposure must be positive, got {}", exposure);
            }
        }
        Ok(())
    }
}

pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}

fn parse_output(value: &str) -> Result<OutputFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "table" | "text" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => bail!("Invalid POPSYNTH_OUTPUT '{}' (expected 'table' or 'json')", other),
    }
}
