pub mod cholesky;
pub mod isolation_forest;
pub mod stats;
