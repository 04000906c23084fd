pub mod config;
pub mod dataset;
pub mod error;

pub use config::{ForestConfig, LabConfig};
pub use dataset::*;
pub use error::*;
