use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PopSynthError;

/// Spacing of histogram bin edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinType {
    /// Equal-width edges
    #[serde(rename = "lin")]
    Linear,
    /// Edges equally spaced in log10
    #[serde(rename = "log")]
    Log10,
    /// Edges equally spaced in natural log
    #[serde(rename = "ln")]
    NaturalLog,
}

impl BinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinType::Linear => "lin",
            BinType::Log10 => "log",
            BinType::NaturalLog => "ln",
        }
    }

    /// Whether edges (and edge padding) are constructed in log space.
    pub fn is_logarithmic(&self) -> bool {
        !matches!(self, BinType::Linear)
    }
}

impl Default for BinType {
    fn default() -> Self {
        BinType::Linear
    }
}

impl fmt::Display for BinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinType {
    type Err = PopSynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lin" | "linear" => Ok(BinType::Linear),
            "log" | "log10" => Ok(BinType::Log10),
            "ln" => Ok(BinType::NaturalLog),
            other => Err(PopSynthError::UnsupportedBinType(other.to_string())),
        }
    }
}

/// How raw bin counts are normalised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Raw counts
    None,
    /// Divide by the tallest bin, so the mode equals 1
    Max,
    /// Weight every sample by 1/N, so counts sum to 1
    #[serde(rename = "prob")]
    Probability,
}

impl Normalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalization::None => "none",
            Normalization::Max => "max",
            Normalization::Probability => "prob",
        }
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization::Max
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Normalization {
    type Err = PopSynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Normalization::None),
            "max" => Ok(Normalization::Max),
            "prob" | "probability" => Ok(Normalization::Probability),
            other => Err(PopSynthError::UnsupportedNormalization(other.to_string())),
        }
    }
}

/// Bin centers and the value in each bin.
///
/// `centers` and `values` always have the same length. A histogram built from
/// a sample with no finite values is the single-point `(NaN, NaN)` sentinel;
/// check [`Histogram::is_no_data`] before plotting or further processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub centers: Vec<f64>,
    pub values: Vec<f64>,
}

impl Histogram {
    pub fn new(centers: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(centers.len(), values.len());
        Self { centers, values }
    }

    /// The "no data to plot" sentinel.
    pub fn no_data() -> Self {
        Self {
            centers: vec![f64::NAN],
            values: vec![f64::NAN],
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.centers.len() == 1 && self.centers[0].is_nan() && self.values[0].is_nan()
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.centers.iter().copied().zip(self.values.iter().copied())
    }
}

/// Two-sided confidence bounds on a Poisson rate, in count units
/// (or rate units once divided by an exposure).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoissonInterval {
    pub low: f64,
    pub high: f64,
}

impl PoissonInterval {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }

    /// Divide both bounds by an exposure, turning counts into rates.
    pub fn per(&self, exposure: f64) -> Self {
        Self {
            low: self.low / exposure,
            high: self.high / exposure,
        }
    }
}
