use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use kpi_insight_core::scoring::achievement::{
    classify_with_threshold, recommendation, score_values,
};
use kpi_insight_core::scoring::{score_peer_ratings, Performance, PeerRatings, Rating};

use super::Session;

/// Arguments for a single-row achievement score
#[derive(Args)]
pub struct AchievementArgs {
    /// Target value for the period
    #[arg(long, allow_hyphen_values = true)]
    pub target: Decimal,

    /// Realized value for the period
    #[arg(long, allow_hyphen_values = true)]
    pub realized: Decimal,

    /// KPI weight in percentage points (0-100)
    #[arg(long, allow_hyphen_values = true)]
    pub weight: Option<Decimal>,
}

/// Arguments for the 360 evaluation score
#[derive(Args)]
pub struct PeerScoreArgs {
    /// Supervisor rating
    #[arg(long, allow_hyphen_values = true)]
    pub supervisor: Rating,

    /// Peer rating
    #[arg(long, allow_hyphen_values = true)]
    pub peer: Rating,

    /// Subordinate rating
    #[arg(long, allow_hyphen_values = true)]
    pub subordinate: Rating,
}

#[derive(Debug, Serialize, Deserialize)]
struct AchievementOutput {
    target: Decimal,
    realized: Decimal,
    weight: Option<Decimal>,
    achievement_pct: Decimal,
    weighted_score: Option<Decimal>,
    performance: Performance,
    recommendation: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PeerScoreOutput {
    peer_score: Decimal,
    scale_max: Decimal,
    ratings: PeerRatings,
}

pub fn run_achievement(
    session: &Session,
    args: AchievementArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;
    let score = score_values(
        Some(args.target),
        Some(args.realized),
        args.weight,
        "command line input",
    )?;
    let performance =
        classify_with_threshold(score.achievement_pct, config.on_track_threshold_pct);

    let output = AchievementOutput {
        target: args.target,
        realized: args.realized,
        weight: args.weight,
        achievement_pct: score.achievement_pct,
        weighted_score: score.weighted_score,
        performance,
        recommendation: recommendation(performance, Some(score.achievement_pct)),
    };
    Ok(serde_json::to_value(output)?)
}

pub fn run_peer_score(
    session: &Session,
    args: PeerScoreArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;
    let ratings = PeerRatings {
        supervisor: args.supervisor,
        peer: args.peer,
        subordinate: args.subordinate,
    };
    let peer_score = score_peer_ratings(&ratings, &config.peer)?;

    let output = PeerScoreOutput {
        peer_score,
        scale_max: config.peer.scale_max,
        ratings,
    };
    Ok(serde_json::to_value(output)?)
}
