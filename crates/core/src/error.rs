use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Row {row} has {found} features, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Covariance matrix is not positive semi-definite (pivot {pivot} = {value})")]
    NotPositiveSemiDefinite { pivot: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, LabError>;
