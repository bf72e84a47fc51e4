use thiserror::Error;

#[derive(Debug, Error)]
pub enum KpiError {
    #[error("Missing value: {field} in {context}")]
    MissingValue { field: String, context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for KpiError {
    fn from(e: serde_json::Error) -> Self {
        KpiError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for KpiError {
    fn from(e: toml::de::Error) -> Self {
        KpiError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for KpiError {
    fn from(e: csv::Error) -> Self {
        KpiError::DataSource(e.to_string())
    }
}
