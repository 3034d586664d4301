pub mod doctor;
pub mod index;
pub mod reset;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};

use memdex::config::MemdexConfig;
use memdex::MemoryIndex;

/// Open the configured agent database.
pub fn open_index(config: &MemdexConfig) -> Result<MemoryIndex> {
    let db_path = config.resolved_db_path();
    MemoryIndex::open(&db_path, &config.index_settings())
        .with_context(|| format!("failed to open memory index at {}", db_path.display()))
}

/// Parse a query embedding given on the command line as a JSON array.
pub fn parse_vector(raw: &str) -> Result<Vec<f32>> {
    serde_json::from_str(raw).context("--vector must be a JSON array of numbers, e.g. [0.1, 0.2]")
}

/// Shorten `text` to at most `max_chars` characters on one line.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("[1, 0.5, -2]").unwrap(), vec![1.0, 0.5, -2.0]);
        assert!(parse_vector("1,2").is_err());
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short\ntext", 80), "short text");
        assert_eq!(preview(&"a".repeat(100), 80), format!("{}...", "a".repeat(80)));
        assert_eq!(preview("ééééé", 3), "ééé...");
    }
}
