use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{dataset} dataset is empty or has no columns")]
    EmptyDataset { dataset: String },

    #[error("unresolved column mappings in {dataset} data: {}", columns.join(", "))]
    UnresolvedColumns {
        dataset: String,
        columns: Vec<String>,
    },

    #[error("column '{column}' not found in {dataset} data")]
    UnknownSourceColumn { dataset: String, column: String },

    #[error("'{column}' cannot be skipped for {dataset} data")]
    MandatorySkip { dataset: String, column: String },

    #[error("critical columns missing in {dataset} after mapping: {}", columns.join(", "))]
    CriticalColumnsMissing {
        dataset: String,
        columns: Vec<String>,
    },

    #[error("invalid month name: {0}")]
    InvalidMonth(String),

    #[error("invalid calendar date: {year}-{month}")]
    InvalidDate { year: i32, month: u32 },

    #[error("row has {found} cells but table has {expected} columns")]
    RowLengthMismatch { expected: usize, found: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
