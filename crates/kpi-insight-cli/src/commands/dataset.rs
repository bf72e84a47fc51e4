use clap::Args;
use serde_json::{json, Value};

use kpi_insight_core::dataset::KpiFilter;

use super::{GroupArgs, Session};

/// Arguments for listing KPI names
#[derive(Args)]
pub struct KpisArgs {
    /// Only KPIs reported for this position ("All" for every position)
    #[arg(long)]
    pub position: Option<String>,
}

pub fn run_positions(session: &Session) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;
    let dataset = session.dataset(&config)?;
    Ok(json!({
        "source": dataset.source(),
        "positions": dataset.positions(),
    }))
}

pub fn run_kpis(
    session: &Session,
    args: KpisArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;
    let dataset = session.dataset(&config)?;
    let filter = KpiFilter::new(args.position, None);
    let position = filter
        .position()
        .filter(|_| dataset.has_position_column());
    Ok(json!({
        "source": dataset.source(),
        "position": position,
        "kpis": dataset.kpi_names(position),
    }))
}

pub fn run_show(
    session: &Session,
    args: GroupArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;
    let dataset = session.dataset(&config)?;
    let group = args.select(&dataset)?;
    Ok(serde_json::to_value(group)?)
}
