use crate::counter::RateCounter;
use crate::error::{RateError, ScaleKind};

/// Apply area scaling to a copy of `rates`.
///
/// `det`, `late` and `faint` are multiplied by `f_area`. `out` is not scaled
/// on its own: it absorbs whatever is left of the pre-scaling total, taken as
/// an absolute value. When the scaled tallies exceed the old total the signed
/// residual is negative and the absolute value hides that; this is logged at
/// warn level but otherwise kept as-is.
///
/// With `area == false` the copy is returned untouched. Scaling a counter
/// that already carries area scaling is rejected rather than compounding
/// the factor.
pub fn scale(rates: &RateCounter, area: bool) -> Result<RateCounter, RateError> {
    if !area {
        return Ok(rates.clone());
    }
    if rates.scaled_area {
        return Err(RateError::AlreadyScaled {
            name: rates.name.clone(),
            kind: ScaleKind::Area,
        });
    }

    let mut scaled = apply_factor(rates, rates.f_area, ScaleKind::Area)?;
    scaled.scaled_area = true;
    Ok(scaled)
}

/// Apply time scaling (`f_time`) to a copy of `rates`, with the same residual
/// policy and re-entrancy guard as [`scale`].
pub fn scale_time(rates: &RateCounter) -> Result<RateCounter, RateError> {
    if rates.scaled_time {
        return Err(RateError::AlreadyScaled {
            name: rates.name.clone(),
            kind: ScaleKind::Time,
        });
    }

    let mut scaled = apply_factor(rates, rates.f_time, ScaleKind::Time)?;
    scaled.scaled_time = true;
    Ok(scaled)
}

fn apply_factor(
    rates: &RateCounter,
    factor: f64,
    kind: ScaleKind,
) -> Result<RateCounter, RateError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(RateError::InvalidFactor {
            name: rates.name.clone(),
            kind,
            factor,
        });
    }

    let tot = rates.tot();
    let mut scaled = rates.clone();
    scaled.det *= factor;
    scaled.late *= factor;
    scaled.faint *= factor;

    let residual = tot - scaled.det - scaled.faint - scaled.late;
    if residual < 0.0 {
        tracing::warn!(
            survey = %rates.name,
            %kind,
            factor,
            residual,
            "Scaled tallies exceed the original total; 'out' takes the absolute residual"
        );
    }
    scaled.out = residual.abs();

    tracing::debug!(
        survey = %rates.name,
        %kind,
        factor,
        det = scaled.det,
        out = scaled.out,
        "Applied rate scaling"
    );

    Ok(scaled)
}
