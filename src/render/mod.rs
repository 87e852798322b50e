pub mod console;
pub mod html;

pub use console::{print_summary, summary_table};
pub use html::render_html;
