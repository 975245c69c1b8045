use thiserror::Error;

/// Errors raised while building a city grid or placing towers on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoverageError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("not allowed to place a tower at ({row}, {col})")]
    InvalidPlacement { row: usize, col: usize },

    #[error("config load error: {0}")]
    ConfigLoad(String),
}

pub type Result<T> = std::result::Result<T, CoverageError>;
