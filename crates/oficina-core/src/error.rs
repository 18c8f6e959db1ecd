use thiserror::Error;

#[derive(Debug, Error)]
pub enum OficinaError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("cannot generate order: {0}")]
    ReferenceMissing(String),

    #[error("row {position} out of range for table '{table}' ({len} rows)")]
    IndexOutOfRange {
        table: String,
        position: usize,
        len: usize,
    },

    #[error("unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("row for table '{table}' must have exactly columns [{expected}], got [{got}]")]
    SchemaMismatch {
        table: String,
        expected: String,
        got: String,
    },

    #[error("table file '{path}' is missing declared column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("invalid record at row {position} of table '{table}': {reason}")]
    InvalidRecord {
        table: String,
        position: usize,
        reason: String,
    },

    #[error("client not found: {0}")]
    ClientNotFound(String),

    #[error("service not found: {0}")]
    ServiceNotFound(String),

    #[error("document error: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, OficinaError>;
