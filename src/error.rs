use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;
