pub mod filter;
pub mod loader;
pub mod observation;

pub use filter::{select_group, KpiFilter, KpiGroup, ALL_POSITIONS};
pub use loader::{load_csv, load_csv_reader, KpiDataset};
pub use observation::{coerce_numeric, KpiObservation};
