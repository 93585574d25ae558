//! API access-log analytics library.
//!
//! Re-exports the analysis entry points used by the `apilog` binary and by
//! the integration tests in `tests/`.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod loader;
pub mod models;
pub mod sample;
pub mod timestamp;

pub use analysis::{analyze_api_logs, analyze_json, LogAnalyzer};
pub use config::AnalyzerConfig;
pub use errors::{AnalyzeError, RejectReason};
pub use models::record::{validate_record, ValidatedRecord};
pub use models::report::AnalysisReport;
