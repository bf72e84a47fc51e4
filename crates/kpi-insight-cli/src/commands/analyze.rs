use clap::Args;
use serde_json::Value;

use kpi_insight_core::analysis;
use kpi_insight_core::scoring::{RaterEntry, RaterInputs};

use super::{GroupArgs, Session};
use crate::input;
use crate::input::file::RatingsFormat;

/// Arguments for full KPI group analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub group: GroupArgs,

    /// Rater inputs: JSON array or CSV of {kpi_id, role, rating}.
    /// When omitted, piped stdin is read as ratings (JSON or CSV, detected
    /// from the content) unless `--data -` already claims stdin.
    #[arg(long)]
    pub ratings: Option<String>,
}

pub fn run_analyze(
    session: &Session,
    args: AnalyzeArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = session.config()?;

    let entries: Vec<RaterEntry> = if let Some(ref path) = args.ratings {
        input::file::read_ratings(path)?
    } else if session.reads_stdin() {
        Vec::new()
    } else if let Some(text) = input::stdin::read_stdin_text()? {
        input::file::parse_ratings(&text, RatingsFormat::sniff(&text), "stdin")?
    } else {
        Vec::new()
    };
    let raters = RaterInputs::from_entries(entries);

    let dataset = session.dataset(&config)?;
    let group = args.group.select(&dataset)?;
    let result = analysis::analyze_group(&group, &raters, &config)?;
    Ok(serde_json::to_value(result)?)
}
