//! Destination URL classifier
//!
//! Two independent tables: an exact-match table over absolute URLs, cached
//! both ways, and an aggressive suffix table checked pattern-by-pattern
//! with no cache.

use std::collections::{HashMap, HashSet};

use super::ip::LookupStats;

/// URL tables with caches for the exact-match path
#[derive(Debug, Clone, Default)]
pub struct UrlAnalyzer {
    /// Exact absolute-URL sets, insertion order
    absolute: Vec<(String, HashSet<String>)>,
    /// Suffix patterns, insertion order
    suffixes: Vec<(String, Vec<String>)>,
    found: HashMap<String, String>,
    not_found: HashSet<String>,
    pub stats: LookupStats,
}

impl UrlAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_absolute(&mut self, name: &str, urls: HashSet<String>) {
        self.absolute.push((name.to_string(), urls));
    }

    pub fn insert_suffixes(&mut self, name: &str, urls: Vec<String>) {
        self.suffixes.push((name.to_string(), urls));
    }

    /// Exact absolute-URL lookup, cached both ways
    pub fn find_absolute(&mut self, url: &str) -> Option<String> {
        self.stats.lookups += 1;

        if self.not_found.contains(url) {
            self.stats.cache_hits += 1;
            return None;
        }
        if let Some(name) = self.found.get(url) {
            self.stats.cache_hits += 1;
            return Some(name.clone());
        }

        self.stats.scans += 1;
        for (name, urls) in &self.absolute {
            if urls.contains(url) {
                self.found.insert(url.to_string(), name.clone());
                return Some(name.clone());
            }
        }

        self.not_found.insert(url.to_string());
        None
    }

    /// Suffix lookup: first pattern the URL ends with wins, in table order.
    ///
    /// Patterns longer than the URL are skipped. Deliberately uncached.
    pub fn find_suffix(&self, url: &str) -> Option<String> {
        for (name, patterns) in &self.suffixes {
            for pattern in patterns {
                if pattern.len() <= url.len() && url.ends_with(pattern.as_str()) {
                    return Some(name.clone());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absolute_exact_match_only() {
        let mut analyzer = UrlAnalyzer::new();
        analyzer.insert_absolute("Maps", set(&["maps.example.com/api/v1"]));

        assert_eq!(
            analyzer.find_absolute("maps.example.com/api/v1"),
            Some("Maps".into())
        );
        assert_eq!(analyzer.find_absolute("maps.example.com/api"), None);
    }

    #[test]
    fn test_absolute_negative_cache() {
        let mut analyzer = UrlAnalyzer::new();
        analyzer.insert_absolute("Maps", set(&["maps.example.com/api/v1"]));

        assert_eq!(analyzer.find_absolute("other.example.com"), None);
        let scans = analyzer.stats.scans;

        analyzer.insert_absolute("Other", set(&["other.example.com"]));
        assert_eq!(analyzer.find_absolute("other.example.com"), None);
        assert_eq!(analyzer.stats.scans, scans);
    }

    #[test]
    fn test_suffix_match_from_end() {
        let mut analyzer = UrlAnalyzer::new();
        analyzer.insert_suffixes("Spotify", vec!["spotify.com".into(), "scdn.co".into()]);

        assert_eq!(analyzer.find_suffix("api.spotify.com"), Some("Spotify".into()));
        assert_eq!(analyzer.find_suffix("audio-fa.scdn.co"), Some("Spotify".into()));
        assert_eq!(analyzer.find_suffix("spotify.com.evil.org"), None);
    }

    #[test]
    fn test_suffix_skips_longer_patterns() {
        let mut analyzer = UrlAnalyzer::new();
        analyzer.insert_suffixes("Svc", vec!["very-long-domain.example.com".into()]);

        assert_eq!(analyzer.find_suffix("a.com"), None);
    }

    #[test]
    fn test_suffix_first_in_table_order_wins() {
        let mut analyzer = UrlAnalyzer::new();
        analyzer.insert_suffixes("Broad", vec!["example.com".into()]);
        analyzer.insert_suffixes("Narrow", vec!["cdn.example.com".into()]);

        assert_eq!(analyzer.find_suffix("x.cdn.example.com"), Some("Broad".into()));
    }
}
