use serde_json::Value;

use kpi_insight_core::analysis;

use super::{GroupArgs, Session};

pub fn run_trend(
    session: &Session,
    args: GroupArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;
    let dataset = session.dataset(&config)?;
    let group = args.select(&dataset)?;
    let result = analysis::trend_report(&group)?;
    Ok(serde_json::to_value(result)?)
}
