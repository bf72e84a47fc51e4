//! 360 evaluation.
//!
//! Three raters score on a bounded integer scale (1-6 by default). The
//! blended rating is rescaled so a perfect score lands on `scale_max`:
//!
//! score = round((s * 0.45 + p * 0.25 + b * 0.30) * scale_max / rating_max, 2)
//!
//! Rater state is owned by the caller and keyed by `(kpi_id, role)`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::PeerEvaluationConfig;
use crate::error::KpiError;
use crate::numeric;
use crate::types::Score;
use crate::KpiResult;

/// Raw rater input. Kept wider than the rating scale so out-of-range
/// values reach the range check instead of failing to parse.
pub type Rating = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaterRole {
    Supervisor,
    Peer,
    Subordinate,
}

impl RaterRole {
    pub const ALL: [RaterRole; 3] = [
        RaterRole::Supervisor,
        RaterRole::Peer,
        RaterRole::Subordinate,
    ];
}

impl fmt::Display for RaterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RaterRole::Supervisor => "supervisor",
            RaterRole::Peer => "peer",
            RaterRole::Subordinate => "subordinate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRatings {
    pub supervisor: Rating,
    pub peer: Rating,
    pub subordinate: Rating,
}

impl PeerRatings {
    pub fn uniform(rating: Rating) -> Self {
        Self {
            supervisor: rating,
            peer: rating,
            subordinate: rating,
        }
    }

    pub fn get(&self, role: RaterRole) -> Rating {
        match role {
            RaterRole::Supervisor => self.supervisor,
            RaterRole::Peer => self.peer,
            RaterRole::Subordinate => self.subordinate,
        }
    }
}

/// One recorded rating, as read from a ratings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaterEntry {
    pub kpi_id: String,
    pub role: RaterRole,
    pub rating: Rating,
}

/// Rater input state keyed by `(kpi_id, role)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaterInputs {
    ratings: BTreeMap<(String, RaterRole), Rating>,
}

impl RaterInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for the same key replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = RaterEntry>) -> Self {
        let mut inputs = Self::new();
        for e in entries {
            inputs.set(&e.kpi_id, e.role, e.rating);
        }
        inputs
    }

    pub fn set(&mut self, kpi_id: &str, role: RaterRole, rating: Rating) {
        self.ratings.insert((kpi_id.to_string(), role), rating);
    }

    pub fn get(&self, kpi_id: &str, role: RaterRole) -> Option<Rating> {
        self.ratings.get(&(kpi_id.to_string(), role)).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Current ratings for a row, filling gaps with `default_rating`.
    pub fn ratings_for(&self, kpi_id: &str, default_rating: u8) -> PeerRatings {
        let pick = |role| self.get(kpi_id, role).unwrap_or(Rating::from(default_rating));
        PeerRatings {
            supervisor: pick(RaterRole::Supervisor),
            peer: pick(RaterRole::Peer),
            subordinate: pick(RaterRole::Subordinate),
        }
    }
}

/// Score with the default weights and 1-6 scale.
pub fn score_peer_evaluation(
    supervisor: Rating,
    peer: Rating,
    subordinate: Rating,
) -> KpiResult<Score> {
    score_peer_ratings(
        &PeerRatings {
            supervisor,
            peer,
            subordinate,
        },
        &PeerEvaluationConfig::default(),
    )
}

/// Score with configured weights and bounds. Ratings outside the bounds are
/// rejected rather than producing an off-scale result.
pub fn score_peer_ratings(
    ratings: &PeerRatings,
    config: &PeerEvaluationConfig,
) -> KpiResult<Score> {
    for role in RaterRole::ALL {
        let r = ratings.get(role);
        if r < Rating::from(config.rating_min) || r > Rating::from(config.rating_max) {
            return Err(KpiError::InvalidInput {
                field: role.to_string(),
                reason: format!(
                    "Rating {} outside [{}, {}]",
                    r, config.rating_min, config.rating_max
                ),
            });
        }
    }

    const CONTEXT: &str = "360 evaluation";
    let weighted = [
        (ratings.supervisor, config.supervisor_weight),
        (ratings.peer, config.peer_weight),
        (ratings.subordinate, config.subordinate_weight),
    ]
    .into_iter()
    .map(|(r, w)| numeric::mul(Decimal::from(r), w, CONTEXT))
    .collect::<KpiResult<Vec<Decimal>>>()?;
    let blended = numeric::sum(weighted, CONTEXT)?;
    let scaled = numeric::div(
        numeric::mul(blended, config.scale_max, CONTEXT)?,
        Decimal::from(config.rating_max),
        CONTEXT,
    )?;

    Ok(scaled.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_perfect_score_is_scale_max() {
        assert_eq!(score_peer_evaluation(6, 6, 6).unwrap(), dec!(20.00));
    }

    #[test]
    fn test_minimum_rating() {
        assert_eq!(score_peer_evaluation(1, 1, 1).unwrap(), dec!(3.33));
    }

    #[test]
    fn test_default_slider_rating() {
        assert_eq!(score_peer_evaluation(4, 4, 4).unwrap(), dec!(13.33));
    }

    #[test]
    fn test_mixed_ratings_weighting() {
        // (6*0.45 + 3*0.25 + 2*0.30) * 20/6 = 4.05 * 3.333.. = 13.5
        assert_eq!(score_peer_evaluation(6, 3, 2).unwrap(), dec!(13.50));
    }

    #[test]
    fn test_supervisor_dominates() {
        let sup_high = score_peer_evaluation(6, 1, 1).unwrap();
        let peer_high = score_peer_evaluation(1, 6, 1).unwrap();
        let sub_high = score_peer_evaluation(1, 1, 6).unwrap();
        assert!(sup_high > sub_high);
        assert!(sub_high > peer_high);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = score_peer_evaluation(0, 4, 4).unwrap_err();
        assert!(matches!(err, KpiError::InvalidInput { ref field, .. } if field == "supervisor"));
        let err = score_peer_evaluation(4, 4, 7).unwrap_err();
        assert!(matches!(err, KpiError::InvalidInput { ref field, .. } if field == "subordinate"));
    }

    #[test]
    fn test_custom_scale() {
        let cfg = PeerEvaluationConfig {
            scale_max: dec!(100),
            rating_max: 5,
            default_rating: 3,
            ..PeerEvaluationConfig::default()
        };
        let score = score_peer_ratings(&PeerRatings::uniform(5), &cfg).unwrap();
        assert_eq!(score, dec!(100));
        assert!(score_peer_ratings(&PeerRatings::uniform(6), &cfg).is_err());
    }

    #[test]
    fn test_oversized_scale_is_overflow_error() {
        let cfg = PeerEvaluationConfig {
            scale_max: Decimal::MAX,
            ..PeerEvaluationConfig::default()
        };
        assert!(matches!(
            score_peer_ratings(&PeerRatings::uniform(6), &cfg),
            Err(KpiError::Overflow { .. })
        ));
    }

    #[test]
    fn test_rater_inputs_keyed_by_kpi_and_role() {
        let inputs = RaterInputs::from_entries(vec![
            RaterEntry {
                kpi_id: "K1".into(),
                role: RaterRole::Peer,
                rating: 2,
            },
            RaterEntry {
                kpi_id: "K2".into(),
                role: RaterRole::Peer,
                rating: 6,
            },
            RaterEntry {
                kpi_id: "K1".into(),
                role: RaterRole::Peer,
                rating: 3,
            },
        ]);
        assert_eq!(inputs.len(), 2);
        let k1 = inputs.ratings_for("K1", 4);
        assert_eq!(
            k1,
            PeerRatings {
                supervisor: 4,
                peer: 3,
                subordinate: 4
            }
        );
        assert_eq!(inputs.ratings_for("K2", 4).peer, 6);
        assert_eq!(inputs.ratings_for("K9", 4), PeerRatings::uniform(4));
    }

    #[test]
    fn test_wild_ratings_parse_then_fail_range_check() {
        let entries: Vec<RaterEntry> = serde_json::from_str(
            r#"[{"kpi_id":"K1","role":"peer","rating":-1},
                {"kpi_id":"K2","role":"supervisor","rating":300}]"#,
        )
        .unwrap();
        let inputs = RaterInputs::from_entries(entries);
        let cfg = PeerEvaluationConfig::default();

        let k1 = inputs.ratings_for("K1", cfg.default_rating);
        let err = score_peer_ratings(&k1, &cfg).unwrap_err();
        assert!(matches!(err, KpiError::InvalidInput { ref field, .. } if field == "peer"));

        let k2 = inputs.ratings_for("K2", cfg.default_rating);
        let err = score_peer_ratings(&k2, &cfg).unwrap_err();
        assert!(matches!(err, KpiError::InvalidInput { ref field, .. } if field == "supervisor"));
    }

    #[test]
    fn test_role_serialization() {
        let e: RaterEntry =
            serde_json::from_str(r#"{"kpi_id":"K1","role":"subordinate","rating":5}"#).unwrap();
        assert_eq!(e.role, RaterRole::Subordinate);
    }
}
