//! Service definition loader
//!
//! A directory of TOML files, each declaring one or more services with
//! their static characteristics and destination lookup keys. Files load in
//! name order so the catalog's table order is stable across runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ipnetwork::IpNetwork;
use serde::Deserialize;

use crate::analyzers::catalog::ServiceDefinition;
use super::TableError;

#[derive(Debug, Deserialize)]
struct ServiceFileDoc {
    #[serde(default)]
    service: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    name: String,
    #[serde(default)]
    characteristics: BTreeMap<String, String>,
    #[serde(default)]
    absolute_urls: Vec<String>,
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    ips: Vec<String>,
}

pub fn load_dir(dir: &Path) -> Result<Vec<ServiceDefinition>, TableError> {
    let mut paths = toml_files(dir)?;
    paths.sort();

    let mut definitions = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(&path).map_err(|e| TableError::ServiceFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let doc: ServiceFileDoc = toml::from_str(&content).map_err(|e| TableError::ServiceFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        for entry in doc.service {
            definitions.push(to_definition(entry, &path)?);
        }
    }
    Ok(definitions)
}

fn to_definition(entry: ServiceEntry, path: &Path) -> Result<ServiceDefinition, TableError> {
    let mut networks = Vec::with_capacity(entry.ips.len());
    for cidr in &entry.ips {
        let network: IpNetwork = cidr.parse().map_err(|e| TableError::ServiceFile {
            path: path.to_path_buf(),
            reason: format!("invalid network {cidr}: {e}"),
        })?;
        networks.push(network);
    }

    Ok(ServiceDefinition {
        name: entry.name,
        characteristics: entry.characteristics,
        absolute_urls: entry.absolute_urls,
        urls: entry.urls,
        networks,
    })
}

fn toml_files(dir: &Path) -> Result<Vec<PathBuf>, TableError> {
    let entries = std::fs::read_dir(dir).map_err(|e| TableError::ServiceFile {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TableError::ServiceFile {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
            paths.push(path);
        }
    }
    Ok(paths)
}
