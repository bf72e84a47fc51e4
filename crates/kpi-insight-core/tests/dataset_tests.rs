use kpi_insight_core::dataset::{load_csv, load_csv_reader, select_group, KpiFilter};
use kpi_insight_core::KpiError;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::io::Write;

const KPI_CSV: &str = "\
ID KPI,NAMA KPI,POSISI PEKERJA,TARGET TW TERKAIT,REALISASI TW TERKAIT,BOBOT
KPI-001,Container Throughput,Terminal Manager,1000,1100,30
KPI-002,Container Throughput,Terminal Manager,1200,1080,30
KPI-003,Berth Occupancy,Terminal Manager,75,80,20
KPI-004,Container Throughput,Finance Officer,900,#N/A,25
KPI-005,Cost Efficiency,Finance Officer,100,95,abc
";

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn test_load_same_file_twice_identical() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(KPI_CSV.as_bytes()).unwrap();

    let first = load_csv(file.path()).unwrap();
    let second = load_csv(file.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
}

#[test]
fn test_upload_and_file_agree() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(KPI_CSV.as_bytes()).unwrap();
    let from_file = load_csv(file.path()).unwrap();
    let from_upload = load_csv_reader(KPI_CSV.as_bytes(), "upload").unwrap();
    assert_eq!(from_file.observations(), from_upload.observations());
}

#[test]
fn test_coercion_marks_missing_not_zero() {
    let ds = load_csv_reader(KPI_CSV.as_bytes(), "upload").unwrap();
    let rows = ds.observations();
    assert_eq!(rows[3].realized, None);
    assert_eq!(rows[3].target, Some(dec!(900)));
    assert_eq!(rows[4].weight, None);
}

#[test]
fn test_ragged_rows_padded_as_missing() {
    let csv = "ID KPI,NAMA KPI,TARGET TW TERKAIT,REALISASI TW TERKAIT,BOBOT\nK1,A,10\n";
    let ds = load_csv_reader(csv.as_bytes(), "ragged").unwrap();
    assert_eq!(ds.observations()[0].realized, None);
    assert_eq!(ds.observations()[0].weight, None);
}

#[test]
fn test_missing_column_reported() {
    let csv = "ID KPI,TARGET TW TERKAIT,REALISASI TW TERKAIT,BOBOT\nK1,1,2,3\n";
    assert!(matches!(
        load_csv_reader(csv.as_bytes(), "bad"),
        Err(KpiError::DataSource(_))
    ));
}

// ===========================================================================
// Selection
// ===========================================================================

#[test]
fn test_positions_and_kpi_names() {
    let ds = load_csv_reader(KPI_CSV.as_bytes(), "upload").unwrap();
    assert_eq!(
        ds.positions(),
        vec!["Finance Officer".to_string(), "Terminal Manager".to_string()]
    );
    assert_eq!(
        ds.kpi_names(Some("Terminal Manager")),
        vec![
            "Container Throughput".to_string(),
            "Berth Occupancy".to_string()
        ]
    );
}

#[test]
fn test_group_for_position_and_kpi() {
    let ds = load_csv_reader(KPI_CSV.as_bytes(), "upload").unwrap();
    let filter = KpiFilter::new(
        Some("Terminal Manager".into()),
        Some("Container Throughput".into()),
    );
    let group = select_group(&ds, &filter).unwrap();
    assert_eq!(group.len(), 2);
    assert!(group.supports_trend());

    let all = select_group(
        &ds,
        &KpiFilter::new(Some("All".into()), Some("Container Throughput".into())),
    )
    .unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_default_group_is_first_kpi() {
    let ds = load_csv_reader(KPI_CSV.as_bytes(), "upload").unwrap();
    let group = select_group(&ds, &KpiFilter::default()).unwrap();
    assert_eq!(group.kpi_name, "Container Throughput");
}
