use thiserror::Error;

#[derive(Error, Debug)]
pub enum CondorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a CSV file: {0}")]
    NotCsv(String),

    #[error("{0}")]
    InvalidCsv(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CondorError>;
