//! Extractors with uniform rejections.

mod enhanced_json;
mod enhanced_path;
mod enhanced_query;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;
pub use self::validated_json::ValidateJson;

/// Keeps the first lines of a rejection message and caps its length.
fn truncate_message(message: &str, max_lines: usize, max_chars: usize) -> String {
    let lines = message.lines().take(max_lines).collect::<Vec<_>>();
    lines.join(" ").chars().take(max_chars).collect()
}
