pub mod text;

pub use text::{clean_key, collapse_whitespace, count_or, html_escape, parse_count};
