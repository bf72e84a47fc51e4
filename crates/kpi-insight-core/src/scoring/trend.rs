//! Trend fit of realized values on target values.
//!
//! Ordinary least squares with intercept, single predictor:
//! slope = sum((x - x_bar)(y - y_bar)) / sum((x - x_bar)^2)
//! intercept = y_bar - slope * x_bar
//!
//! Rows missing either value are excluded from the fit but still receive a
//! prediction when their target is present.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dataset::KpiObservation;
use crate::error::KpiError;
use crate::numeric;
use crate::KpiResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: Decimal,
    pub intercept: Decimal,
    /// Coefficient of determination; `None` when realized values have no
    /// variance.
    pub r_squared: Option<Decimal>,
    /// Rows with both target and realized present.
    pub observations_used: usize,
    /// Rows skipped for a missing target or realized value.
    pub observations_excluded: usize,
    /// In-sample prediction per input row, `None` where target is missing.
    pub predictions: Vec<Option<Decimal>>,
}

impl TrendFit {
    pub fn predict(&self, target: Decimal) -> KpiResult<Decimal> {
        predict_value(self.slope, self.intercept, target)
    }
}

const CONTEXT: &str = "trend fit";

fn predict_value(slope: Decimal, intercept: Decimal, target: Decimal) -> KpiResult<Decimal> {
    numeric::add(intercept, numeric::mul(slope, target, CONTEXT)?, CONTEXT)
}

/// Fit realized on target over a KPI group.
///
/// Callers check `group.len() > 1` before asking for a fit; the function
/// still rejects fewer than two usable points with `InsufficientData`.
/// Identical usable targets give `DegenerateFit`. Values too large for
/// Decimal give `Overflow`.
pub fn fit_trend(group: &[KpiObservation]) -> KpiResult<TrendFit> {
    let points: Vec<(Decimal, Decimal)> = group.iter().filter_map(|o| o.fit_point()).collect();
    let excluded = group.len() - points.len();

    if points.len() < 2 {
        return Err(KpiError::InsufficientData(format!(
            "Trend fit needs at least 2 rows with target and realized values, got {} ({} excluded for missing values)",
            points.len(),
            excluded
        )));
    }

    let n = Decimal::from(points.len() as u64);
    let x_sum = numeric::sum(points.iter().map(|(x, _)| *x), CONTEXT)?;
    let y_sum = numeric::sum(points.iter().map(|(_, y)| *y), CONTEXT)?;
    let x_bar = numeric::div(x_sum, n, CONTEXT)?;
    let y_bar = numeric::div(y_sum, n, CONTEXT)?;

    let mut centred = Vec::with_capacity(points.len());
    for (x, y) in &points {
        centred.push((
            numeric::sub(*x, x_bar, CONTEXT)?,
            numeric::sub(*y, y_bar, CONTEXT)?,
        ));
    }

    // Large magnitudes are shifted by a power of ten before squaring.
    let max_dx = centred.iter().map(|(dx, _)| dx.abs()).fold(Decimal::ZERO, Decimal::max);
    let max_dy = centred.iter().map(|(_, dy)| dy.abs()).fold(Decimal::ZERO, Decimal::max);
    let x_scale = numeric::pow10_scale(max_dx);
    let y_scale = numeric::pow10_scale(max_dy);
    let scaled: Vec<(Decimal, Decimal)> = centred
        .iter()
        .map(|(dx, dy)| (*dx / x_scale, *dy / y_scale))
        .collect();

    let mut sxy = Decimal::ZERO;
    let mut sxx = Decimal::ZERO;
    let mut syy = Decimal::ZERO;
    for (dx, dy) in &scaled {
        sxy = numeric::add(sxy, numeric::mul(*dx, *dy, CONTEXT)?, CONTEXT)?;
        sxx = numeric::add(sxx, numeric::mul(*dx, *dx, CONTEXT)?, CONTEXT)?;
        syy = numeric::add(syy, numeric::mul(*dy, *dy, CONTEXT)?, CONTEXT)?;
    }

    if sxx == Decimal::ZERO {
        return Err(KpiError::DegenerateFit(format!(
            "All {} usable targets equal {}; slope is undefined",
            points.len(),
            x_bar
        )));
    }

    // Slope in rescaled units, then back to target/realized units.
    let unit_slope = numeric::div(sxy, sxx, CONTEXT)?;
    let slope = numeric::mul(unit_slope, numeric::div(y_scale, x_scale, CONTEXT)?, CONTEXT)?;
    let intercept = numeric::sub(y_bar, numeric::mul(slope, x_bar, CONTEXT)?, CONTEXT)?;

    let r_squared = if syy == Decimal::ZERO {
        None
    } else {
        let mut ss_res = Decimal::ZERO;
        for (dx, dy) in &scaled {
            let r = numeric::sub(*dy, numeric::mul(unit_slope, *dx, CONTEXT)?, CONTEXT)?;
            ss_res = numeric::add(ss_res, numeric::mul(r, r, CONTEXT)?, CONTEXT)?;
        }
        Some(Decimal::ONE - numeric::div(ss_res, syy, CONTEXT)?)
    };

    let predictions = group
        .iter()
        .map(|o| o.target.map(|t| predict_value(slope, intercept, t)).transpose())
        .collect::<KpiResult<Vec<Option<Decimal>>>>()?;

    if excluded > 0 {
        tracing::debug!(excluded, "rows with missing values excluded from trend fit");
    }
    tracing::debug!(%slope, %intercept, used = points.len(), "trend fitted");

    Ok(TrendFit {
        slope,
        intercept,
        r_squared,
        observations_used: points.len(),
        observations_excluded: excluded,
        predictions,
    })
}
