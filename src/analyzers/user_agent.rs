//! User-agent analysis
//!
//! Converts a raw user-agent string into device-level and app-level hint
//! maps: an ordered pattern table with `APP_`/`DEV_` named capture groups
//! picks the primary evidence, two complementary heuristic sources fill in
//! what the patterns left open, and every value is normalized before it is
//! merged anywhere.

use regex::Regex;

use crate::core::device::HintMap;
use super::heuristics::{
    BuiltinDevicePatterns, BuiltinGrammar, DevicePatterns, UaGrammar,
};

/// Generic OS family assigned when a distribution name is recognized
const GENERIC_LINUX: &str = "Linux";

/// Device and app hint maps extracted from one user-agent string
#[derive(Debug, Clone, Default)]
pub struct UaHints {
    pub device_args: HintMap,
    pub app_args: HintMap,
}

impl UaHints {
    /// Empty maps signal "no new evidence"
    pub fn is_empty(&self) -> bool {
        self.device_args.is_empty() && self.app_args.is_empty()
    }
}

/// Pattern table plus complementary heuristics
pub struct UserAgentAnalyzer {
    patterns: Vec<Regex>,
    linux_distributions: Vec<String>,
    grammar: Box<dyn UaGrammar>,
    device_patterns: Box<dyn DevicePatterns>,
}

impl UserAgentAnalyzer {
    /// Analyzer with the built-in heuristic sources
    pub fn new(patterns: Vec<Regex>, linux_distributions: Vec<String>) -> Self {
        Self::with_heuristics(
            patterns,
            linux_distributions,
            Box::new(BuiltinGrammar::new()),
            Box::new(BuiltinDevicePatterns::new()),
        )
    }

    /// Analyzer with substituted heuristic sources
    pub fn with_heuristics(
        patterns: Vec<Regex>,
        linux_distributions: Vec<String>,
        grammar: Box<dyn UaGrammar>,
        device_patterns: Box<dyn DevicePatterns>,
    ) -> Self {
        Self {
            patterns,
            linux_distributions: linux_distributions
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            grammar,
            device_patterns,
        }
    }

    /// Extract hint maps from a user-agent string.
    ///
    /// Among all matching patterns the one with the most non-empty named
    /// captures wins, first in table order on ties. Heuristic sources only
    /// fill keys the winning pattern left open.
    pub fn get_best_match(&self, user_agent: &str) -> UaHints {
        let (mut device_args, mut app_args) = self.best_pattern_match(user_agent);

        self.apply_grammar(user_agent, &mut device_args, &mut app_args);
        self.apply_device_patterns(user_agent, &mut device_args, &mut app_args);
        self.reclassify_distribution(&mut device_args);

        UaHints {
            device_args: normalize(&device_args),
            app_args: normalize(&app_args),
        }
    }

    fn best_pattern_match(&self, user_agent: &str) -> (HintMap, HintMap) {
        let mut device_args = HintMap::new();
        let mut app_args = HintMap::new();
        let mut max_groups = 0usize;

        for pattern in &self.patterns {
            let caps = match pattern.captures(user_agent) {
                Some(caps) => caps,
                None => continue,
            };

            let mut dev = HintMap::new();
            let mut app = HintMap::new();
            let mut count = 0usize;
            for name in pattern.capture_names().flatten() {
                let value = match caps.name(name) {
                    Some(m) if !m.as_str().is_empty() => m.as_str(),
                    _ => continue,
                };
                count += 1;
                if let Some(key) = name.strip_prefix("APP_") {
                    app.insert(key.to_string(), value.to_string());
                } else if let Some(key) = name.strip_prefix("DEV_") {
                    dev.insert(key.to_string(), value.to_string());
                }
            }

            if count > max_groups {
                max_groups = count;
                device_args = dev;
                app_args = app;
            }
        }

        (device_args, app_args)
    }

    fn apply_grammar(&self, user_agent: &str, device_args: &mut HintMap, app_args: &mut HintMap) {
        let parsed = self.grammar.parse(user_agent);

        if let Some(brand) = &parsed.device_brand {
            if has_useful_data(brand) && !device_args.contains_key("brand") {
                device_args.insert("brand".to_string(), brand.clone());
            }
        }

        let os_family = parsed.os.family.clone();
        if let Some(family) = &os_family {
            if has_useful_data(family) && !device_args.contains_key("os_family") {
                device_args.insert("os_family".to_string(), family.clone());
            }
        }

        if !device_args.contains_key("os_version") {
            let version = parsed.os.version.compose();
            if !version.is_empty() {
                device_args.insert("os_version".to_string(), version);
            }
        }

        // the agent family often just repeats the OS; only a differing
        // family names an application, and only when the patterns did not
        if let (Some(family), Some(agent)) = (&os_family, &parsed.agent.family) {
            if family != agent && app_args.is_empty() {
                app_args.insert("name".to_string(), agent.clone());
                let version = parsed.agent.version.compose();
                if !version.is_empty() {
                    app_args.insert("version".to_string(), version);
                }
            }
        }
    }

    fn apply_device_patterns(
        &self,
        user_agent: &str,
        device_args: &mut HintMap,
        app_args: &mut HintMap,
    ) {
        let response = self.device_patterns.parse(user_agent);

        if let Some(model) = response.model {
            if !device_args.contains_key("model") {
                device_args.insert("model".to_string(), model);
            }
        }
        if let Some(family) = response.os_family {
            if !device_args.contains_key("os_family") {
                device_args.insert("os_family".to_string(), family);
            }
        }
        if let Some(app) = response.app_name {
            if !app_args.contains_key("name") {
                app_args.insert("name".to_string(), app);
            }
        }
    }

    fn reclassify_distribution(&self, device_args: &mut HintMap) {
        let family = match device_args.get("os_family") {
            Some(family) => family.clone(),
            None => return,
        };
        if self
            .linux_distributions
            .iter()
            .any(|d| *d == family.to_lowercase())
        {
            device_args.insert("os_distribution".to_string(), family);
            device_args.insert("os_family".to_string(), GENERIC_LINUX.to_string());
        }
    }
}

fn has_useful_data(data: &str) -> bool {
    data != "Other" && data != "Generic"
}

/// Unescape `%20`, then map non-alphanumerics to `.` for version-like keys
/// and to spaces for everything else
fn normalize(args: &HintMap) -> HintMap {
    args.iter()
        .map(|(key, value)| {
            let unescaped = value.replace("%20", " ");
            let replacement = if key.contains("version") || key.contains("kit") {
                '.'
            } else {
                ' '
            };
            let normalized: String = unescaped
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { replacement })
                .collect();
            (key.clone(), normalized)
        })
        .collect()
}
