use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("column \"{name}\" has {actual} values, but table has {expected} rows")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("sentiment model \"{0}\" is not available in this build (enable the \"{0}\" feature)")]
    ModelUnavailable(String),

    #[error("failed to load sentiment model: {0}")]
    ModelLoad(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
