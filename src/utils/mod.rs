pub mod logging;
pub mod text;

pub use text::{extract_author_id, parse_count, truncate_text};
