pub mod context;
pub mod output;
pub mod summarizer;
pub mod types;

pub use context::RunContext;
pub use output::{write_report, write_status};
pub use summarizer::Summarizer;
pub use types::{CollectionStatus, ReportFailure, RunOutcome, StatusFile};
