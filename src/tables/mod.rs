//! External table loading
//!
//! All lookup tables load before the first packet is processed. Any
//! malformed or missing table is fatal, with a distinct error kind per
//! table class; there is no partial or degraded load.

pub mod distros;
pub mod inference;
pub mod patterns;
pub mod services;

use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::analyzers::{InferenceEngine, ServiceCatalog};
use crate::config::TablesConfig;

/// Table loading failures, one kind per table class
#[derive(Error, Debug)]
pub enum TableError {
    #[error("user-agent pattern file {path}: {reason}")]
    PatternFile { path: PathBuf, reason: String },

    #[error("service definition file {path}: {reason}")]
    ServiceFile { path: PathBuf, reason: String },

    #[error("inference rule file {path}: {reason}")]
    InferenceFile { path: PathBuf, reason: String },

    #[error("distribution list {path}: {reason}")]
    DistributionList { path: PathBuf, reason: String },
}

/// Everything a session needs, loaded and ready
pub struct LoadedTables {
    pub patterns: Vec<Regex>,
    pub catalog: ServiceCatalog,
    pub inference: InferenceEngine,
    pub linux_distributions: Vec<String>,
}

/// Load every table named by the configuration.
///
/// User-supplied files and directories extend the built-in ones, keeping
/// ordered-table semantics: user patterns and rules append after the
/// built-in entries.
pub fn load(config: &TablesConfig) -> Result<LoadedTables, TableError> {
    let mut patterns = patterns::load_file(&config.patterns_file)?;
    if let Some(extra) = &config.user_patterns_file {
        patterns.extend(patterns::load_file(extra)?);
    }

    let mut definitions = services::load_dir(&config.services_dir)?;
    if let Some(extra) = &config.user_services_dir {
        definitions.extend(services::load_dir(extra)?);
    }
    let mut catalog = ServiceCatalog::new();
    for definition in definitions {
        catalog.add_definition(definition);
    }

    let mut rules = inference::load_dir(&config.inference_dir)?;
    if let Some(extra) = &config.user_inference_dir {
        rules.extend(inference::load_dir(extra)?);
    }
    let inference = InferenceEngine::from_rules(rules);

    let linux_distributions = distros::load_file(&config.distributions_file)?;

    info!(
        patterns = patterns.len(),
        services = catalog.len(),
        inference_rules = inference.len(),
        distributions = linux_distributions.len(),
        "tables loaded"
    );

    Ok(LoadedTables {
        patterns,
        catalog,
        inference,
        linux_distributions,
    })
}
