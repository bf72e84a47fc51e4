pub mod config;
pub mod error;
pub mod numeric;
pub mod types;

#[cfg(feature = "dataset")]
pub mod dataset;

#[cfg(feature = "scoring")]
pub mod scoring;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use config::ScoringConfig;
pub use error::KpiError;
pub use types::*;

/// Standard result type for all kpi-insight operations
pub type KpiResult<T> = Result<T, KpiError>;
