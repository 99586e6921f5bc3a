use std::time::Duration;
use thiserror::Error;

pub type EnhanceResult<T> = Result<T, EnhanceError>;

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON report error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cargo extraction error: {0}")]
    Extraction(String),

    #[error("Column '{column}' not found in table #{table}")]
    ColumnNotFound { table: usize, column: String },

    #[error("Table #{table} was not sorted within {timeout:?}")]
    SortTimeout { table: usize, timeout: Duration },

    #[error("Table #{table} reported sort completion but column {column} is not marked ascending")]
    SortNotObserved { table: usize, column: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watch error: {0}")]
    Watch(String),
}
