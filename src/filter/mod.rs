/// 噪声过滤与脱敏
pub mod noise;
pub mod redact;

pub use noise::{NOISE_ASSERTION_NAMES, NoiseFilter};
pub use redact::{contains_secret, redact_sensitive};
