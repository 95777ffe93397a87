pub mod error;
pub mod metrics;
pub mod options;
pub mod progress;
pub mod report;
