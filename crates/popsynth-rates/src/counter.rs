use std::fmt;

use serde::{Deserialize, Serialize};

/// Days in a Julian year; volumetric rates are quoted per year.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Outcome of a single simulated source as seen by a survey.
/// Every source ends up in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionOutcome {
    Detected,
    /// Inside the survey, but below the S/N threshold
    TooFaint,
    /// Would have been detected, but arrived after the survey ended
    TooLate,
    /// Outside the survey's sky coverage or time window
    OutsideSurvey,
}

impl DetectionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DetectionOutcome::Detected => "Detected",
            DetectionOutcome::TooFaint => "Too faint",
            DetectionOutcome::TooLate => "Too late",
            DetectionOutcome::OutsideSurvey => "Outside survey",
        }
    }
}

/// Detection tallies and metadata for one survey.
///
/// Fields are only written through [`record`](RateCounter::record) and the
/// metadata setters; the `scaled_*` flags can only be raised by the scaling
/// functions, so a counter always knows which corrections it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateCounter {
    pub(crate) name: String,
    pub(crate) det: f64,
    pub(crate) faint: f64,
    pub(crate) late: f64,
    pub(crate) out: f64,
    /// Number per Gpc^3
    pub(crate) vol: f64,
    pub(crate) days: f64,
    pub(crate) f_area: f64,
    pub(crate) f_time: f64,
    pub(crate) scaled_area: bool,
    pub(crate) scaled_time: bool,
}

impl Default for RateCounter {
    fn default() -> Self {
        Self {
            name: String::new(),
            det: 0.0,
            faint: 0.0,
            late: 0.0,
            out: 0.0,
            vol: 0.0,
            days: 0.0,
            f_area: 1.0,
            f_time: 1.0,
            scaled_area: false,
            scaled_time: false,
        }
    }
}

impl RateCounter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Count one source with the given outcome.
    pub fn record(&mut self, outcome: DetectionOutcome) {
        self.record_weighted(outcome, 1.0);
    }

    /// Count a (possibly fractional) weight of sources with the given outcome.
    pub fn record_weighted(&mut self, outcome: DetectionOutcome, weight: f64) {
        match outcome {
            DetectionOutcome::Detected => self.det += weight,
            DetectionOutcome::TooFaint => self.faint += weight,
            DetectionOutcome::TooLate => self.late += weight,
            DetectionOutcome::OutsideSurvey => self.out += weight,
        }
    }

    pub fn tally(&self, outcome: DetectionOutcome) -> f64 {
        match outcome {
            DetectionOutcome::Detected => self.det,
            DetectionOutcome::TooFaint => self.faint,
            DetectionOutcome::TooLate => self.late,
            DetectionOutcome::OutsideSurvey => self.out,
        }
    }

    pub fn set_days(&mut self, days: f64) -> &mut Self {
        self.days = days;
        self
    }

    pub fn set_vol(&mut self, vol: f64) -> &mut Self {
        self.vol = vol;
        self
    }

    pub fn set_area_factor(&mut self, f_area: f64) -> &mut Self {
        self.f_area = f_area;
        self
    }

    pub fn set_time_factor(&mut self, f_time: f64) -> &mut Self {
        self.f_time = f_time;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn det(&self) -> f64 {
        self.det
    }

    pub fn faint(&self) -> f64 {
        self.faint
    }

    pub fn late(&self) -> f64 {
        self.late
    }

    pub fn out(&self) -> f64 {
        self.out
    }

    pub fn vol(&self) -> f64 {
        self.vol
    }

    pub fn days(&self) -> f64 {
        self.days
    }

    pub fn f_area(&self) -> f64 {
        self.f_area
    }

    pub fn f_time(&self) -> f64 {
        self.f_time
    }

    pub fn scaled_area(&self) -> bool {
        self.scaled_area
    }

    pub fn scaled_time(&self) -> bool {
        self.scaled_time
    }

    /// Total number of sources across all outcomes.
    pub fn tot(&self) -> f64 {
        self.det + self.out + self.faint + self.late
    }

    /// Days before a detection is expected. NaN when nothing was detected.
    pub fn exp(&self) -> f64 {
        if self.det == 0.0 {
            return f64::NAN;
        }
        self.days / self.det
    }

    /// Fixed-width summary table, one row per outcome.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Float cell text: whole values keep a trailing `.0` and non-finite values
/// print as `nan`/`inf`, so tallies always read as decimals.
fn decimal(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn row(label: &str, days: impl fmt::Display, frbs: impl fmt::Display) -> String {
    format!("{:20.19} {:>10} {:>10}\n", label, days.to_string(), frbs.to_string())
}

impl fmt::Display for RateCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = row(&self.name, "Days", "FRBs");
        let line = format!("{}\n", "-".repeat(title.trim().chars().count()));

        let rdays = decimal(round_to(self.days, 3));
        let mut table = title;
        table.push_str(&line);
        table.push_str(&row("Cosmic Population", &rdays, format!("{:.0}", self.tot())));
        table.push_str(&row("Detected", &rdays, decimal(round_to(self.det, 3))));
        table.push_str(&row("Too late", &rdays, decimal(round_to(self.late, 3))));
        table.push_str(&row("Too faint", &rdays, decimal(round_to(self.faint, 3))));
        table.push_str(&row("Outside survey", &rdays, decimal(round_to(self.out, 3))));
        table.push_str(&row("/Gpc^3", decimal(DAYS_PER_YEAR), decimal(round_to(self.vol, 3))));
        table.push_str(&row("Expected", decimal(round_to(self.exp(), 4)), 1));
        table.push_str(&line);

        f.write_str(&table)
    }
}
