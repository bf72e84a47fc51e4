use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::Weight;

/// One KPI row for a position in a reporting period.
///
/// Numeric fields are `None` when the raw cell could not be coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiObservation {
    pub kpi_id: String,
    pub kpi_name: String,
    /// Position / unit of the worker; empty when the dataset has no
    /// position column.
    pub position: String,
    pub target: Option<Decimal>,
    pub realized: Option<Decimal>,
    /// Percentage points, 0-100 expected
    pub weight: Option<Weight>,
}

impl KpiObservation {
    /// Both fit inputs present.
    pub fn fit_point(&self) -> Option<(Decimal, Decimal)> {
        match (self.target, self.realized) {
            (Some(t), Some(r)) => Some((t, r)),
            _ => None,
        }
    }
}

/// Coerce a raw cell into a number. Anything unparsable is missing,
/// never an error.
pub fn coerce_numeric(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
