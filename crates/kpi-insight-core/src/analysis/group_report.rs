//! Per-request analysis of one KPI group.
//!
//! Each call recomputes everything from the group rows and the caller's
//! rater inputs. Nothing is cached between calls.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::chart::{build_chart, ChartSeries};
use crate::config::ScoringConfig;
use crate::dataset::KpiGroup;
use crate::error::KpiError;
use crate::numeric;
use crate::scoring::{
    achievement::{classify_achievement, recommendation, score_achievement, AchievementScore},
    fit_trend, score_peer_ratings, Performance, PeerRatings, RaterInputs, TrendFit,
};
use crate::types::{with_metadata, ComputationOutput, Percentage, Score};
use crate::KpiResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAnalysis {
    pub kpi_id: String,
    pub kpi_name: String,
    pub position: String,
    pub target: Option<Decimal>,
    pub realized: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub predicted: Option<Decimal>,
    pub achievement_pct: Option<Percentage>,
    pub weighted_score: Option<Score>,
    pub performance: Performance,
    pub recommendation: String,
    pub peer_ratings: PeerRatings,
    /// 360 score on [0, scale_max]; `None` when a rating is out of range
    pub peer_score: Option<Score>,
    /// Row-level problems (missing values, zero target, bad ratings)
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub rows: usize,
    pub on_track: usize,
    pub needs_coaching: usize,
    pub undetermined: usize,
    /// Sum of weighted scores over rows where one is defined; `None` when
    /// the sum overflows
    pub total_weighted_score: Option<Score>,
    /// Mean achievement over scored rows
    pub mean_achievement_pct: Option<Percentage>,
    pub mean_peer_score: Option<Score>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAnalysis {
    pub kpi_name: String,
    pub position: Option<String>,
    /// `None` when the fit was degenerate or lacked usable rows
    pub trend: Option<TrendFit>,
    pub rows: Vec<RowAnalysis>,
    pub summary: GroupSummary,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub kpi_name: String,
    pub position: Option<String>,
    pub fit: TrendFit,
    pub chart: ChartSeries,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Full analysis of a KPI group: trend, per-row achievement and
/// classification, recommendations, and 360 scores.
///
/// A group of one row or fewer is rejected with `InsufficientData` before
/// anything else is computed.
pub fn analyze_group(
    group: &KpiGroup,
    raters: &RaterInputs,
    config: &ScoringConfig,
) -> KpiResult<ComputationOutput<GroupAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    ensure_trend_supported(group)?;

    let trend = match fit_trend(&group.observations) {
        Ok(fit) => {
            if fit.observations_excluded > 0 {
                warnings.push(format!(
                    "{} row(s) excluded from the trend fit for missing target or realized values.",
                    fit.observations_excluded
                ));
            }
            Some(fit)
        }
        Err(
            e @ (KpiError::DegenerateFit(_)
            | KpiError::InsufficientData(_)
            | KpiError::Overflow { .. }),
        ) => {
            tracing::warn!(kpi = %group.kpi_name, error = %e, "trend unavailable");
            warnings.push(format!("Trend unavailable: {}", e));
            None
        }
        Err(e) => return Err(e),
    };

    let mut rows = Vec::with_capacity(group.len());
    for (idx, obs) in group.observations.iter().enumerate() {
        let mut issues = Vec::new();

        let achievement: Option<AchievementScore> = match score_achievement(obs) {
            Ok(a) => {
                if a.weighted_score.is_none() {
                    issues.push("Weight missing; weighted score unavailable".to_string());
                }
                Some(a)
            }
            Err(e) => {
                tracing::debug!(kpi_id = %obs.kpi_id, error = %e, "row excluded from scoring");
                issues.push(e.to_string());
                None
            }
        };

        let performance =
            classify_achievement(achievement.as_ref(), config.on_track_threshold_pct);
        let achievement_pct = achievement.as_ref().map(|a| a.achievement_pct);

        let peer_ratings = raters.ratings_for(&obs.kpi_id, config.peer.default_rating);
        let peer_score = match score_peer_ratings(&peer_ratings, &config.peer) {
            Ok(s) => Some(s),
            Err(e) => {
                issues.push(e.to_string());
                None
            }
        };

        rows.push(RowAnalysis {
            kpi_id: obs.kpi_id.clone(),
            kpi_name: obs.kpi_name.clone(),
            position: obs.position.clone(),
            target: obs.target,
            realized: obs.realized,
            weight: obs.weight,
            predicted: trend.as_ref().and_then(|t| t.predictions[idx]),
            achievement_pct,
            weighted_score: achievement.as_ref().and_then(|a| a.weighted_score),
            performance,
            recommendation: recommendation(performance, achievement_pct),
            peer_ratings,
            peer_score,
            issues,
        });
    }

    let summary = summarize(&rows, &mut warnings);
    if summary.undetermined > 0 {
        warnings.push(format!(
            "{} row(s) could not be scored and are excluded from aggregates.",
            summary.undetermined
        ));
    }

    let chart = build_chart(&group.observations, trend.as_ref());

    let output = GroupAnalysis {
        kpi_name: group.kpi_name.clone(),
        position: group.position.clone(),
        trend,
        rows,
        summary,
        chart,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "trend_model": "OLS realized ~ target with intercept",
        "achievement": "realized / target * 100, unclamped",
        "on_track_threshold_pct": config.on_track_threshold_pct,
        "peer_weights": {
            "supervisor": config.peer.supervisor_weight,
            "peer": config.peer.peer_weight,
            "subordinate": config.peer.subordinate_weight,
        },
        "peer_scale_max": config.peer.scale_max,
        "default_rating": config.peer.default_rating,
    });

    Ok(with_metadata(
        "KPI achievement scoring with linear trend and 360 evaluation",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Trend fit plus chart series for a group.
pub fn trend_report(group: &KpiGroup) -> KpiResult<ComputationOutput<TrendReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    ensure_trend_supported(group)?;
    let fit = fit_trend(&group.observations)?;
    if fit.observations_excluded > 0 {
        warnings.push(format!(
            "{} row(s) excluded from the fit for missing values.",
            fit.observations_excluded
        ));
    }
    let chart = build_chart(&group.observations, Some(&fit));

    let output = TrendReport {
        kpi_name: group.kpi_name.clone(),
        position: group.position.clone(),
        fit,
        chart,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "trend_model": "OLS realized ~ target with intercept",
        "prediction": "in-sample",
    });

    Ok(with_metadata(
        "Simple linear regression of realized on target",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ensure_trend_supported(group: &KpiGroup) -> KpiResult<()> {
    if !group.supports_trend() {
        return Err(KpiError::InsufficientData(format!(
            "KPI '{}' has {} row(s); at least 2 are needed, choose another KPI",
            group.kpi_name,
            group.len()
        )));
    }
    Ok(())
}

fn summarize(rows: &[RowAnalysis], warnings: &mut Vec<String>) -> GroupSummary {
    let count = |p: Performance| rows.iter().filter(|r| r.performance == p).count();

    let weighted: Vec<Decimal> = rows.iter().filter_map(|r| r.weighted_score).collect();
    let achievements: Vec<Decimal> = rows.iter().filter_map(|r| r.achievement_pct).collect();
    let peer_scores: Vec<Decimal> = rows.iter().filter_map(|r| r.peer_score).collect();

    let mut aggregate = |result: KpiResult<Option<Decimal>>| match result {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "aggregate unavailable");
            warnings.push(format!("Aggregate unavailable: {}", e));
            None
        }
    };

    let total_weighted_score =
        aggregate(numeric::sum(weighted, "total weighted score").map(Some));
    let mean_achievement_pct = aggregate(numeric::mean(&achievements, "mean achievement"));
    let mean_peer_score = aggregate(numeric::mean(&peer_scores, "mean 360 score"));

    GroupSummary {
        rows: rows.len(),
        on_track: count(Performance::OnTrack),
        needs_coaching: count(Performance::NeedsCoaching),
        undetermined: count(Performance::Undetermined),
        total_weighted_score,
        mean_achievement_pct,
        mean_peer_score: mean_peer_score.map(|m| m.round_dp(2)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
