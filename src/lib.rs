//! wanscope - passive device and service fingerprinting
//!
//! Correlates already-dissected packet fields from one capture session
//! into an inventory of devices and the services they use:
//! - per-transport stream state tracking
//! - fuzzy device/service matching and merging
//! - heuristic enrichment with non-determinism detection
//! - destination classification with caching

pub mod analyzers;
pub mod config;
pub mod core;
pub mod report;
pub mod session;
pub mod tables;

// Re-export commonly used types for convenience
pub use analyzers::{InferenceEngine, ServiceCatalog, UserAgentAnalyzer};
pub use config::Config;
pub use core::{Device, PacketRecord, PacketView, Service};
pub use report::SessionReport;
pub use session::Environment;
pub use tables::{LoadedTables, TableError};
