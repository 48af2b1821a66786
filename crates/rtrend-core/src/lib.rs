pub mod archive;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod trend;

pub use config::TrendConfig;
pub use error::TrendError;
pub use pipeline::{generate_trend, TrendOutcome, TrendReport};
