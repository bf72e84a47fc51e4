//! CSV loading into an immutable [`KpiDataset`] snapshot.
//!
//! Header names follow the source spreadsheet export. Numeric cells are
//! coerced with [`coerce_numeric`]; a bad cell never aborts the load.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::observation::{coerce_numeric, KpiObservation};
use crate::error::KpiError;
use crate::KpiResult;

pub const COL_KPI_ID: &str = "ID KPI";
pub const COL_KPI_NAME: &str = "NAMA KPI";
pub const COL_POSITION: &str = "POSISI PEKERJA";
pub const COL_TARGET: &str = "TARGET TW TERKAIT";
pub const COL_REALIZED: &str = "REALISASI TW TERKAIT";
pub const COL_WEIGHT: &str = "BOBOT";

/// Immutable dataset snapshot. Loaded once, shared by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDataset {
    source: String,
    has_position_column: bool,
    observations: Vec<KpiObservation>,
}

impl KpiDataset {
    pub fn from_observations(
        source: impl Into<String>,
        has_position_column: bool,
        observations: Vec<KpiObservation>,
    ) -> Self {
        Self {
            source: source.into(),
            has_position_column,
            observations,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_position_column(&self) -> bool {
        self.has_position_column
    }

    pub fn observations(&self) -> &[KpiObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct non-empty positions, sorted.
    pub fn positions(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .observations
            .iter()
            .map(|o| o.position.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        set.into_iter().map(String::from).collect()
    }

    /// Distinct KPI names in order of first appearance, optionally
    /// restricted to one position.
    pub fn kpi_names(&self, position: Option<&str>) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for obs in &self.observations {
            if let Some(p) = position {
                if obs.position != p {
                    continue;
                }
            }
            if seen.insert(obs.kpi_name.as_str()) {
                names.push(obs.kpi_name.clone());
            }
        }
        names
    }

    /// Number of numeric cells that failed coercion, per field.
    pub fn missing_counts(&self) -> MissingCounts {
        let mut counts = MissingCounts::default();
        for obs in &self.observations {
            counts.target += usize::from(obs.target.is_none());
            counts.realized += usize::from(obs.realized.is_none());
            counts.weight += usize::from(obs.weight.is_none());
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCounts {
    pub target: usize,
    pub realized: usize,
    pub weight: usize,
}

/// Load a dataset from a CSV file.
pub fn load_csv(path: &Path) -> KpiResult<KpiDataset> {
    if !path.exists() {
        return Err(KpiError::DataSource(format!(
            "File not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(KpiError::DataSource(format!("Not a file: {}", path.display())));
    }
    let file = File::open(path).map_err(|e| {
        KpiError::DataSource(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    load_csv_reader(file, &path.display().to_string())
}

/// Load a dataset from any CSV byte stream (file, upload, stdin).
pub fn load_csv_reader<R: Read>(reader: R, source: &str) -> KpiResult<KpiDataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let find = |name: &str| headers.iter().position(|h| h == name);
    let require = |name: &str| {
        find(name).ok_or_else(|| {
            KpiError::DataSource(format!("{}: missing required column '{}'", source, name))
        })
    };

    let id_idx = require(COL_KPI_ID)?;
    let name_idx = require(COL_KPI_NAME)?;
    let target_idx = require(COL_TARGET)?;
    let realized_idx = require(COL_REALIZED)?;
    let weight_idx = require(COL_WEIGHT)?;
    let position_idx = find(COL_POSITION);

    let mut observations = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        observations.push(KpiObservation {
            kpi_id: cell(id_idx).to_string(),
            kpi_name: cell(name_idx).to_string(),
            position: position_idx.map(|i| cell(i).to_string()).unwrap_or_default(),
            target: coerce_numeric(cell(target_idx)),
            realized: coerce_numeric(cell(realized_idx)),
            weight: coerce_numeric(cell(weight_idx)),
        });
    }

    let dataset = KpiDataset {
        source: source.to_string(),
        has_position_column: position_idx.is_some(),
        observations,
    };

    let missing = dataset.missing_counts();
    if missing.target + missing.realized + missing.weight > 0 {
        tracing::warn!(
            source,
            target = missing.target,
            realized = missing.realized,
            weight = missing.weight,
            "non-numeric cells coerced to missing"
        );
    }
    tracing::info!(source, rows = dataset.len(), "loaded KPI dataset");

    Ok(dataset)
}
