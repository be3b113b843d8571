//! Destination IP classifier
//!
//! Maps destination addresses onto service names through per-service CIDR
//! tables. Lookups are cached both ways so repeated hits and repeated
//! misses never rescan the table.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use ipnetwork::IpNetwork;

/// Lookup counters, exposed so cache behavior is observable
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupStats {
    pub lookups: u64,
    pub cache_hits: u64,
    pub scans: u64,
}

/// Per-service network entry; table order is insertion order
#[derive(Debug, Clone)]
struct IpServiceEntry {
    name: String,
    networks: Vec<IpNetwork>,
}

/// CIDR table with positive and negative caches
#[derive(Debug, Clone, Default)]
pub struct IpAnalyzer {
    entries: Vec<IpServiceEntry>,
    found: HashMap<IpAddr, String>,
    not_found: HashSet<IpAddr>,
    pub stats: LookupStats,
}

impl IpAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service's networks; earlier registrations win on overlap
    pub fn insert(&mut self, name: &str, networks: Vec<IpNetwork>) {
        self.entries.push(IpServiceEntry {
            name: name.to_string(),
            networks,
        });
    }

    /// Resolve an address to a service name.
    ///
    /// Consults the negative cache, then the positive cache, then scans
    /// the table in insertion order; the first containing network wins.
    /// The outcome is cached either way.
    pub fn find_service(&mut self, ip: IpAddr) -> Option<String> {
        self.stats.lookups += 1;

        if self.not_found.contains(&ip) {
            self.stats.cache_hits += 1;
            return None;
        }
        if let Some(name) = self.found.get(&ip) {
            self.stats.cache_hits += 1;
            return Some(name.clone());
        }

        self.stats.scans += 1;
        for entry in &self.entries {
            if entry.networks.iter().any(|net| net.contains(ip)) {
                self.found.insert(ip, entry.name.clone());
                return Some(entry.name.clone());
            }
        }

        self.not_found.insert(ip);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> IpNetwork {
        s.parse().unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_containing_network_wins() {
        let mut analyzer = IpAnalyzer::new();
        analyzer.insert("CDN", vec![net("151.101.0.0/16")]);

        assert_eq!(analyzer.find_service(ip("151.101.1.140")), Some("CDN".into()));
        assert_eq!(analyzer.find_service(ip("8.8.8.8")), None);
    }

    #[test]
    fn test_insertion_order_breaks_overlap() {
        let mut analyzer = IpAnalyzer::new();
        analyzer.insert("First", vec![net("10.0.0.0/8")]);
        analyzer.insert("Second", vec![net("10.1.0.0/16")]);

        assert_eq!(analyzer.find_service(ip("10.1.2.3")), Some("First".into()));
    }

    #[test]
    fn test_negative_cache_skips_rescan() {
        let mut analyzer = IpAnalyzer::new();
        analyzer.insert("CDN", vec![net("151.101.0.0/16")]);

        assert_eq!(analyzer.find_service(ip("8.8.8.8")), None);
        let scans = analyzer.stats.scans;

        // a table mutation after the first miss must not change the answer
        analyzer.insert("DNS", vec![net("8.8.8.0/24")]);
        assert_eq!(analyzer.find_service(ip("8.8.8.8")), None);
        assert_eq!(analyzer.stats.scans, scans);
    }

    #[test]
    fn test_positive_cache_skips_rescan() {
        let mut analyzer = IpAnalyzer::new();
        analyzer.insert("CDN", vec![net("151.101.0.0/16")]);

        analyzer.find_service(ip("151.101.1.140"));
        let scans = analyzer.stats.scans;

        assert_eq!(analyzer.find_service(ip("151.101.1.140")), Some("CDN".into()));
        assert_eq!(analyzer.stats.scans, scans);
        assert_eq!(analyzer.stats.cache_hits, 1);
    }
}
