pub mod achievement;
pub mod peer_review;
pub mod trend;

pub use achievement::{
    classify_achievement, classify_performance, recommendation, score_achievement,
    AchievementScore, Performance,
};
pub use peer_review::{
    score_peer_evaluation, score_peer_ratings, PeerRatings, Rating, RaterEntry, RaterInputs,
    RaterRole,
};
pub use trend::{fit_trend, TrendFit};
