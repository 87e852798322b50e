pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod html;
pub mod logger;
pub mod render;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use aggregate::{AggregatedReport, aggregate};
pub use error::{Result, RudigestError};
pub use render::render_html;
pub use report::{CollectionSummary, FailureRecord};
pub use runner::{RunContext, RunOutcome, Summarizer};
