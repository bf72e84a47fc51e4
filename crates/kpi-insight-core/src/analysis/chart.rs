use serde::{Deserialize, Serialize};

use crate::dataset::KpiObservation;
use crate::scoring::TrendFit;
use crate::types::SeriesPoint;

/// Data behind the "realized vs target" chart: scatter of actuals and the
/// fitted line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub actual: Vec<SeriesPoint>,
    pub predicted: Vec<SeriesPoint>,
}

/// Build both series, each sorted by target. Rows without a target are
/// left out of both; rows without a realized value only lack the actual
/// point.
pub fn build_chart(rows: &[KpiObservation], fit: Option<&TrendFit>) -> ChartSeries {
    let mut actual: Vec<SeriesPoint> = rows
        .iter()
        .filter_map(|o| o.fit_point())
        .map(|(x, y)| SeriesPoint { x, y })
        .collect();

    let mut predicted: Vec<SeriesPoint> = match fit {
        Some(fit) => rows
            .iter()
            .zip(&fit.predictions)
            .filter_map(|(o, p)| match (o.target, p) {
                (Some(x), Some(y)) => Some(SeriesPoint { x, y: *y }),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    };

    actual.sort_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));
    predicted.sort_by(|a, b| a.x.cmp(&b.x));
    predicted.dedup();

    ChartSeries { actual, predicted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fit_trend;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn row(target: Option<Decimal>, realized: Option<Decimal>) -> KpiObservation {
        KpiObservation {
            kpi_id: "K".into(),
            kpi_name: "Revenue".into(),
            position: String::new(),
            target,
            realized,
            weight: None,
        }
    }

    #[test]
    fn test_series_sorted_by_target() {
        let rows = vec![
            row(Some(dec!(200)), Some(dec!(180))),
            row(Some(dec!(100)), Some(dec!(110))),
            row(Some(dec!(150)), None),
        ];
        let fit = fit_trend(&rows).unwrap();
        let chart = build_chart(&rows, Some(&fit));
        let xs: Vec<Decimal> = chart.actual.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![dec!(100), dec!(200)]);
        let px: Vec<Decimal> = chart.predicted.iter().map(|p| p.x).collect();
        assert_eq!(px, vec![dec!(100), dec!(150), dec!(200)]);
        assert_eq!(chart.predicted[1].y, dec!(145));
    }

    #[test]
    fn test_no_fit_no_line() {
        let rows = vec![row(Some(dec!(1)), Some(dec!(1)))];
        let chart = build_chart(&rows, None);
        assert_eq!(chart.actual.len(), 1);
        assert!(chart.predicted.is_empty());
    }
}
