//! User-agent pattern file loader
//!
//! One regex per line, `#` comments and blank lines skipped. Line order is
//! the pattern table order.

use std::path::Path;

use regex::Regex;

use super::TableError;

pub fn load_file(path: &Path) -> Result<Vec<Regex>, TableError> {
    let content = std::fs::read_to_string(path).map_err(|e| TableError::PatternFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut patterns = Vec::new();
    for line in content.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let pattern = Regex::new(line).map_err(|e| TableError::PatternFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        patterns.push(pattern);
    }
    Ok(patterns)
}
