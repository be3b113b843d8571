//! Linux distribution name list loader
//!
//! One name per line; `#` comments and blank lines skipped. The analyzer
//! matches these case-insensitively against resolved OS families.

use std::path::Path;

use super::TableError;

pub fn load_file(path: &Path) -> Result<Vec<String>, TableError> {
    let content = std::fs::read_to_string(path).map_err(|e| TableError::DistributionList {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect())
}
