pub mod analyze;
pub mod dataset;
pub mod scoring;
pub mod trend;

use clap::Args;
use std::path::PathBuf;

use kpi_insight_core::config::load_config;
use kpi_insight_core::dataset::{
    load_csv, load_csv_reader, select_group, KpiDataset, KpiFilter, KpiGroup,
};
use kpi_insight_core::ScoringConfig;

use crate::input;

/// Global options shared by every subcommand.
pub struct Session {
    pub config_path: Option<PathBuf>,
    /// `-` reads the dataset from stdin
    pub data: Option<String>,
}

impl Session {
    pub fn config(&self) -> Result<ScoringConfig, Box<dyn std::error::Error>> {
        Ok(load_config(self.config_path.as_deref())?)
    }

    /// Load the dataset snapshot: `--data` when given, otherwise the
    /// configured `data_path`.
    pub fn dataset(
        &self,
        config: &ScoringConfig,
    ) -> Result<KpiDataset, Box<dyn std::error::Error>> {
        match self.data.as_deref() {
            Some("-") => {
                let bytes = input::stdin::read_stdin_bytes()?;
                Ok(load_csv_reader(bytes.as_slice(), "stdin")?)
            }
            Some(path) => {
                let canonical = input::file::resolve_path(path)?;
                Ok(load_csv(&canonical)?)
            }
            None => Ok(load_csv(&config.data_path)?),
        }
    }

    pub fn reads_stdin(&self) -> bool {
        self.data.as_deref() == Some("-")
    }
}

/// Group selection flags
#[derive(Args)]
pub struct GroupArgs {
    /// Position / unit filter ("All" for every position)
    #[arg(long)]
    pub position: Option<String>,

    /// KPI name (defaults to the first KPI in the selection)
    #[arg(long)]
    pub kpi: Option<String>,
}

impl GroupArgs {
    pub fn select(&self, dataset: &KpiDataset) -> Result<KpiGroup, Box<dyn std::error::Error>> {
        let filter = KpiFilter::new(self.position.clone(), self.kpi.clone());
        Ok(select_group(dataset, &filter)?)
    }
}
