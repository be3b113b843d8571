use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up next to the working directory
const DEFAULT_CONFIG: &str = "wanscope.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tables: TablesConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Locations of the external lookup tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    /// Built-in user-agent pattern file
    pub patterns_file: PathBuf,
    /// Directory of service definition files (*.toml)
    pub services_dir: PathBuf,
    /// Directory of inference rule files (*.csv)
    pub inference_dir: PathBuf,
    /// Linux distribution name list
    pub distributions_file: PathBuf,

    /// Extra pattern file appended after the built-in one
    #[serde(default)]
    pub user_patterns_file: Option<PathBuf>,
    /// Extra service definition directory
    #[serde(default)]
    pub user_services_dir: Option<PathBuf>,
    /// Extra inference rule directory
    #[serde(default)]
    pub user_inference_dir: Option<PathBuf>,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            patterns_file: PathBuf::from("tables/user_agent_patterns.txt"),
            services_dir: PathBuf::from("tables/services"),
            inference_dir: PathBuf::from("tables/inference"),
            distributions_file: PathBuf::from("tables/linux_distributions.txt"),
            user_patterns_file: None,
            user_services_dir: None,
            user_inference_dir: None,
        }
    }
}

/// Session behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seed for the tie-breaking random source; unset draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Load the default config file if present, else built-in defaults
    pub fn load_or_default() -> Result<Self> {
        let path = PathBuf::from(DEFAULT_CONFIG);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
