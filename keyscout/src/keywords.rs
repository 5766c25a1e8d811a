use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::errors::{SearchError, SearchResult};

/// Splits newline-delimited text into keywords.
///
/// Surrounding whitespace is trimmed and blank lines are dropped; order is kept.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Drops repeated keywords, keeping the first occurrence of each
pub fn dedup_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Loads keywords from a UTF-8 text file, one keyword per line
pub fn load_keywords(path: &Path) -> SearchResult<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| SearchError::keyword_source(path, e))?;
    let keywords = parse_keywords(&text);
    debug!("Loaded {} keywords from {}", keywords.len(), path.display());
    Ok(keywords)
}
