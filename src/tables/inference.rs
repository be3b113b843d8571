//! Inference rule loader
//!
//! A directory of `;`-delimited CSV files with a header row; every record
//! becomes one flat string-keyed rule. File name order fixes the rule
//! order the engine's sequential merge depends on.

use std::path::{Path, PathBuf};

use crate::analyzers::inference::InferenceRule;
use super::TableError;

pub fn load_dir(dir: &Path) -> Result<Vec<InferenceRule>, TableError> {
    let mut paths = csv_files(dir)?;
    paths.sort();

    let mut rules = Vec::new();
    for path in paths {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(&path)
            .map_err(|e| TableError::InferenceFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let headers = reader
            .headers()
            .map_err(|e| TableError::InferenceFile {
                path: path.clone(),
                reason: e.to_string(),
            })?
            .clone();

        for record in reader.records() {
            let record = record.map_err(|e| TableError::InferenceFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;

            let mut rule = InferenceRule::new();
            for (header, field) in headers.iter().zip(record.iter()) {
                if !field.is_empty() {
                    rule.insert(header.to_string(), field.to_string());
                }
            }
            if !rule.is_empty() {
                rules.push(rule);
            }
        }
    }
    Ok(rules)
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, TableError> {
    let entries = std::fs::read_dir(dir).map_err(|e| TableError::InferenceFile {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TableError::InferenceFile {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.extension().map(|ext| ext == "csv").unwrap_or(false) {
            paths.push(path);
        }
    }
    Ok(paths)
}
