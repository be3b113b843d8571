//! Evidence analyzers
//!
//! Everything that turns raw packet evidence (user-agent strings,
//! destination addresses, accumulated characteristics) into hint maps
//! and service names.

pub mod catalog;
pub mod heuristics;
pub mod inference;
pub mod ip;
pub mod url;
pub mod user_agent;

pub use catalog::ServiceCatalog;
pub use inference::InferenceEngine;
pub use ip::IpAnalyzer;
pub use url::UrlAnalyzer;
pub use user_agent::{UaHints, UserAgentAnalyzer};
