use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::KpiObservation;
use crate::error::KpiError;
use crate::numeric;
use crate::types::{Percentage, Score, Weight};
use crate::KpiResult;

/// Default on-track threshold, inclusive.
pub const ON_TRACK_THRESHOLD_PCT: Percentage = dec!(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementScore {
    /// realized / target * 100, unclamped
    pub achievement_pct: Percentage,
    /// achievement_pct * weight / 100; `None` when weight is missing
    pub weighted_score: Option<Score>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Performance {
    OnTrack,
    NeedsCoaching,
    /// Achievement could not be computed for the row.
    Undetermined,
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Performance::OnTrack => "on-track",
            Performance::NeedsCoaching => "needs-coaching",
            Performance::Undetermined => "undetermined",
        };
        f.write_str(s)
    }
}

/// Score one row.
pub fn score_achievement(row: &KpiObservation) -> KpiResult<AchievementScore> {
    score_values(row.target, row.realized, row.weight, &row.kpi_id)
}

/// Score raw values. `context` names the row in error messages.
pub fn score_values(
    target: Option<Decimal>,
    realized: Option<Decimal>,
    weight: Option<Weight>,
    context: &str,
) -> KpiResult<AchievementScore> {
    let target = target.ok_or_else(|| KpiError::MissingValue {
        field: "target".into(),
        context: context.to_string(),
    })?;
    if target.is_zero() {
        return Err(KpiError::DivisionByZero {
            context: format!("achievement percentage for {} (target is zero)", context),
        });
    }
    let realized = realized.ok_or_else(|| KpiError::MissingValue {
        field: "realized".into(),
        context: context.to_string(),
    })?;

    let overflow_context = format!("achievement percentage for {}", context);
    let ratio = numeric::div(realized, target, &overflow_context)?;
    let achievement_pct = numeric::mul(ratio, dec!(100), &overflow_context)?;
    let weighted_score = match weight {
        Some(w) => {
            let weighted_context = format!("weighted score for {}", context);
            let product = numeric::mul(achievement_pct, w, &weighted_context)?;
            Some(numeric::div(product, dec!(100), &weighted_context)?)
        }
        None => None,
    };

    Ok(AchievementScore {
        achievement_pct,
        weighted_score,
    })
}

/// `pct >= 100` is on track.
pub fn classify_performance(pct: Percentage) -> Performance {
    classify_with_threshold(pct, ON_TRACK_THRESHOLD_PCT)
}

pub fn classify_with_threshold(pct: Percentage, threshold: Percentage) -> Performance {
    if pct >= threshold {
        Performance::OnTrack
    } else {
        Performance::NeedsCoaching
    }
}

/// Undefined achievement classifies as `Undetermined`, never as a miss.
pub fn classify_achievement(
    score: Option<&AchievementScore>,
    threshold: Percentage,
) -> Performance {
    match score {
        Some(s) => classify_with_threshold(s.achievement_pct, threshold),
        None => Performance::Undetermined,
    }
}

/// Recommendation line shown next to each row.
pub fn recommendation(performance: Performance, pct: Option<Percentage>) -> String {
    match (performance, pct) {
        (Performance::OnTrack, Some(p)) => {
            format!("On track, keep it up (achievement: {:.1}%)", p)
        }
        (Performance::NeedsCoaching, Some(p)) => {
            format!("Needs coaching and strategy review (achievement: {:.1}%)", p)
        }
        _ => "Achievement cannot be assessed: target or realized value unavailable".to_string(),
    }
}
