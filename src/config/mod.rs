pub mod loader;
pub mod types;

pub use loader::{CliOverrides, ConfigLoader};
pub use types::{DigestConfig, DigestSettings, ExtractConfig, FilterConfig, OutputConfig};
