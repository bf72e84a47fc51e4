//! Scoring configuration.
//!
//! Resolution order for [`load_config`]:
//! 1. an explicit path (CLI `--config`)
//! 2. `$KPI_INSIGHT_CONFIG`
//! 3. `config/kpi_insight.toml` relative to the working directory
//! 4. built-in defaults
//!
//! Every field is optional in the TOML file and falls back to the default.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::KpiError;
use crate::types::{Percentage, Score};
use crate::KpiResult;

pub const CONFIG_ENV: &str = "KPI_INSIGHT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/kpi_insight.toml";
pub const DEFAULT_DATA_PATH: &str = "kpi_cleaned.csv";

/// Weights and bounds for the 360 evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerEvaluationConfig {
    pub supervisor_weight: Decimal,
    pub peer_weight: Decimal,
    pub subordinate_weight: Decimal,
    /// Upper end of the output scale (a perfect rating maps here).
    pub scale_max: Score,
    pub rating_min: u8,
    pub rating_max: u8,
    /// Rating assumed for a rater role with no recorded input.
    pub default_rating: u8,
}

impl Default for PeerEvaluationConfig {
    fn default() -> Self {
        Self {
            supervisor_weight: dec!(0.45),
            peer_weight: dec!(0.25),
            subordinate_weight: dec!(0.30),
            scale_max: dec!(20),
            rating_min: 1,
            rating_max: 6,
            default_rating: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Dataset used when no file is given on the command line.
    pub data_path: PathBuf,
    /// Achievement at or above this percentage counts as on track.
    pub on_track_threshold_pct: Percentage,
    pub peer: PeerEvaluationConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            on_track_threshold_pct: dec!(100),
            peer: PeerEvaluationConfig::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> KpiResult<()> {
        if self.on_track_threshold_pct <= Decimal::ZERO {
            return Err(KpiError::InvalidInput {
                field: "on_track_threshold_pct".into(),
                reason: "Threshold must be positive".into(),
            });
        }
        self.peer.validate()
    }
}

impl PeerEvaluationConfig {
    pub fn validate(&self) -> KpiResult<()> {
        let weights = [
            ("supervisor_weight", self.supervisor_weight),
            ("peer_weight", self.peer_weight),
            ("subordinate_weight", self.subordinate_weight),
        ];
        for (field, w) in weights {
            if w < Decimal::ZERO {
                return Err(KpiError::InvalidInput {
                    field: field.into(),
                    reason: "Rater weight cannot be negative".into(),
                });
            }
        }
        let total = self.supervisor_weight + self.peer_weight + self.subordinate_weight;
        if total != Decimal::ONE {
            return Err(KpiError::InvalidInput {
                field: "peer".into(),
                reason: format!("Rater weights must sum to 1, got {}", total),
            });
        }
        if self.scale_max <= Decimal::ZERO {
            return Err(KpiError::InvalidInput {
                field: "scale_max".into(),
                reason: "Scale maximum must be positive".into(),
            });
        }
        if self.rating_min < 1 || self.rating_min >= self.rating_max {
            return Err(KpiError::InvalidInput {
                field: "rating_min".into(),
                reason: format!(
                    "Rating bounds must satisfy 1 <= min < max, got [{}, {}]",
                    self.rating_min, self.rating_max
                ),
            });
        }
        if self.default_rating < self.rating_min || self.default_rating > self.rating_max {
            return Err(KpiError::InvalidInput {
                field: "default_rating".into(),
                reason: format!(
                    "Default rating {} outside [{}, {}]",
                    self.default_rating, self.rating_min, self.rating_max
                ),
            });
        }
        Ok(())
    }
}

/// Parse and validate a TOML configuration document.
pub fn parse_config(content: &str) -> KpiResult<ScoringConfig> {
    let config: ScoringConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit TOML file.
pub fn load_config_from(path: &Path) -> KpiResult<ScoringConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        KpiError::DataSource(format!("Failed to read config '{}': {}", path.display(), e))
    })?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "loaded scoring config");
    Ok(config)
}

/// Resolve configuration: explicit path, then env var, then the
/// conventional file, then defaults.
pub fn load_config(explicit: Option<&Path>) -> KpiResult<ScoringConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(KpiError::DataSource(format!(
                "{} points to non-existent path {}",
                CONFIG_ENV,
                pb.display()
            )));
        }
        return load_config_from(&pb);
    }
    let conventional = PathBuf::from(DEFAULT_CONFIG_PATH);
    if conventional.exists() {
        return load_config_from(&conventional);
    }
    Ok(ScoringConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_weights() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.peer.supervisor_weight, dec!(0.45));
        assert_eq!(cfg.peer.peer_weight, dec!(0.25));
        assert_eq!(cfg.peer.subordinate_weight, dec!(0.30));
        assert_eq!(cfg.peer.scale_max, dec!(20));
        assert_eq!(cfg.data_path, PathBuf::from("kpi_cleaned.csv"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = parse_config(
            r#"
            data_path = "data/q3.csv"

            [peer]
            default_rating = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("data/q3.csv"));
        assert_eq!(cfg.peer.default_rating, 5);
        assert_eq!(cfg.peer.rating_max, 6);
        assert_eq!(cfg.on_track_threshold_pct, dec!(100));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let err = parse_config(
            r#"
            [peer]
            supervisor_weight = "0.5"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, KpiError::InvalidInput { .. }));
    }

    #[test]
    fn test_reject_inverted_rating_bounds() {
        let mut cfg = ScoringConfig::default();
        cfg.peer.rating_min = 6;
        cfg.peer.rating_max = 6;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_reject_default_rating_out_of_bounds() {
        let mut cfg = ScoringConfig::default();
        cfg.peer.default_rating = 7;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = parse_config("peer = [").unwrap_err();
        assert!(matches!(err, KpiError::SerializationError(_)));
    }

    #[test]
    fn test_explicit_path_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpi.toml");
        std::fs::write(&path, "on_track_threshold_pct = \"95\"\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.on_track_threshold_pct, dec!(95));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(Some(&path)),
            Err(KpiError::DataSource(_))
        ));
    }
}
