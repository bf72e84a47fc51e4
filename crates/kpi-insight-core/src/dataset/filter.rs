use serde::{Deserialize, Serialize};

use super::loader::KpiDataset;
use super::observation::KpiObservation;
use crate::error::KpiError;
use crate::KpiResult;

/// Position value meaning "no position filter".
pub const ALL_POSITIONS: &str = "All";

/// Selection made by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// `None` selects the first KPI name in dataset order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi_name: Option<String>,
}

impl KpiFilter {
    pub fn new(position: Option<String>, kpi_name: Option<String>) -> Self {
        Self { position, kpi_name }
    }

    /// Effective position filter; `"All"` and blanks collapse to `None`.
    pub fn position(&self) -> Option<&str> {
        self.position
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != ALL_POSITIONS)
    }
}

/// Rows sharing one KPI name, in dataset order. The unit of analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiGroup {
    pub kpi_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub observations: Vec<KpiObservation>,
}

impl KpiGroup {
    pub fn new(
        kpi_name: impl Into<String>,
        position: Option<String>,
        observations: Vec<KpiObservation>,
    ) -> Self {
        Self {
            kpi_name: kpi_name.into(),
            position,
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// A trend fit needs more than one row.
    pub fn supports_trend(&self) -> bool {
        self.observations.len() > 1
    }
}

/// Build the group for a filter. A named KPI with no matching rows yields
/// an empty group; an unnamed KPI on an empty selection is an error since
/// there is nothing to pick.
pub fn select_group(dataset: &KpiDataset, filter: &KpiFilter) -> KpiResult<KpiGroup> {
    let mut position = filter.position();
    if position.is_some() && !dataset.has_position_column() {
        tracing::warn!(
            source = dataset.source(),
            "dataset has no position column; ignoring position filter"
        );
        position = None;
    }

    let kpi_name = match filter.kpi_name.as_deref() {
        Some(name) => name.to_string(),
        None => dataset
            .kpi_names(position)
            .into_iter()
            .next()
            .ok_or_else(|| {
                KpiError::InsufficientData(match position {
                    Some(p) => format!("No KPI rows for position '{}'", p),
                    None => "Dataset contains no KPI rows".into(),
                })
            })?,
    };

    let observations: Vec<KpiObservation> = dataset
        .observations()
        .iter()
        .filter(|o| position.map_or(true, |p| o.position == p))
        .filter(|o| o.kpi_name == kpi_name)
        .cloned()
        .collect();

    tracing::debug!(
        kpi = %kpi_name,
        position = position.unwrap_or(ALL_POSITIONS),
        rows = observations.len(),
        "selected KPI group"
    );

    Ok(KpiGroup {
        kpi_name,
        position: position.map(String::from),
        observations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn obs(id: &str, name: &str, position: &str) -> KpiObservation {
        KpiObservation {
            kpi_id: id.into(),
            kpi_name: name.into(),
            position: position.into(),
            target: Some(dec!(100)),
            realized: Some(dec!(100)),
            weight: Some(dec!(10)),
        }
    }

    fn dataset() -> KpiDataset {
        KpiDataset::from_observations(
            "test",
            true,
            vec![
                obs("K1", "Revenue", "Ops"),
                obs("K2", "Revenue", "Finance"),
                obs("K3", "Safety", "Ops"),
                obs("K4", "Revenue", "Ops"),
            ],
        )
    }

    #[test]
    fn test_select_by_name_all_positions() {
        let f = KpiFilter::new(None, Some("Revenue".into()));
        let g = select_group(&dataset(), &f).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.position, None);
    }

    #[test]
    fn test_all_keyword_means_no_filter() {
        let f = KpiFilter::new(Some("All".into()), Some("Revenue".into()));
        assert_eq!(f.position(), None);
        assert_eq!(select_group(&dataset(), &f).unwrap().len(), 3);
    }

    #[test]
    fn test_select_by_position_keeps_order() {
        let f = KpiFilter::new(Some("Ops".into()), Some("Revenue".into()));
        let g = select_group(&dataset(), &f).unwrap();
        let ids: Vec<&str> = g.observations.iter().map(|o| o.kpi_id.as_str()).collect();
        assert_eq!(ids, vec!["K1", "K4"]);
    }

    #[test]
    fn test_default_kpi_is_first_in_position() {
        let f = KpiFilter::new(Some("Ops".into()), None);
        let g = select_group(&dataset(), &f).unwrap();
        assert_eq!(g.kpi_name, "Revenue");
    }

    #[test]
    fn test_unknown_name_gives_empty_group() {
        let f = KpiFilter::new(None, Some("Nope".into()));
        let g = select_group(&dataset(), &f).unwrap();
        assert!(g.is_empty());
        assert!(!g.supports_trend());
    }

    #[test]
    fn test_unknown_position_without_name_is_insufficient() {
        let f = KpiFilter::new(Some("Legal".into()), None);
        assert!(matches!(
            select_group(&dataset(), &f),
            Err(KpiError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_position_ignored_without_column() {
        let ds = KpiDataset::from_observations(
            "flat",
            false,
            vec![obs("K1", "A", ""), obs("K2", "A", "")],
        );
        let f = KpiFilter::new(Some("Ops".into()), Some("A".into()));
        assert_eq!(select_group(&ds, &f).unwrap().len(), 2);
    }
}
