use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which correction a scaling step applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleKind {
    Area,
    Time,
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleKind::Area => f.write_str("area"),
            ScaleKind::Time => f.write_str("time"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("Rates for '{name}' already have {kind} scaling applied")]
    AlreadyScaled { name: String, kind: ScaleKind },

    #[error("Invalid {kind} scaling factor for '{name}': {factor}")]
    InvalidFactor {
        name: String,
        kind: ScaleKind,
        factor: f64,
    },
}
