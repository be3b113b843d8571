//! Inference rule engine
//!
//! Maps partial characteristic sets to additional inferred characteristics.
//! The sequential merge is order-dependent: rule processing order decides
//! which keys end up flagged as non-deterministic. That behavior is part of
//! the engine's contract and must not be replaced with a commutative merge.

use std::collections::HashSet;

use crate::core::device::HintMap;

/// One inference rule: a flat string-keyed record
pub type InferenceRule = HintMap;

/// Rule table over accumulated device characteristics
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    rules: Vec<InferenceRule>,
}

impl InferenceEngine {
    pub fn from_rules(rules: Vec<InferenceRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Infer additional characteristics from the ones already known.
    ///
    /// A rule matches when it shares at least one key with the input and
    /// every shared key compares equal case-sensitively. Matching rules
    /// contribute their novel keys; repeated keys are reduced to their
    /// case-insensitive common prefix, and a key whose candidates ever
    /// disagree completely is dropped from the result.
    pub fn analyze(&self, characteristics: &HintMap) -> HintMap {
        let mut ret = HintMap::new();
        let mut non_deterministic: HashSet<String> = HashSet::new();

        for rule in &self.rules {
            if !rule_matches(rule, characteristics) {
                continue;
            }
            for (key, value) in rule {
                if characteristics.contains_key(key) {
                    continue;
                }
                match ret.get(key) {
                    None => {
                        ret.insert(key.clone(), value.clone());
                    }
                    Some(existing) => {
                        let common = common_initial_substring(value, existing);
                        if common.is_empty() {
                            // sticky: checked only at the end, later
                            // agreeing candidates may still update ret
                            non_deterministic.insert(key.clone());
                        } else {
                            ret.insert(key.clone(), common);
                        }
                    }
                }
            }
        }

        for key in &non_deterministic {
            ret.remove(key);
        }

        ret
    }
}

/// Shared keys must be non-empty and agree exactly
fn rule_matches(rule: &InferenceRule, characteristics: &HintMap) -> bool {
    let mut shared = false;
    for (key, value) in rule {
        if let Some(known) = characteristics.get(key) {
            shared = true;
            if known != value {
                return false;
            }
        }
    }
    shared
}

/// Case-insensitive longest common prefix, characters taken from `s1`
fn common_initial_substring(s1: &str, s2: &str) -> String {
    let mut ret = String::new();
    for (a, b) in s1.chars().zip(s2.chars()) {
        if a.eq_ignore_ascii_case(&b) {
            ret.push(a);
        } else {
            break;
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pairs: &[(&str, &str)]) -> InferenceRule {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_shared_keys_no_match() {
        let engine = InferenceEngine::from_rules(vec![rule(&[("brand", "Apple")])]);
        let out = engine.analyze(&rule(&[("os_family", "Android")]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_shared_key_must_match_case_sensitively() {
        let engine = InferenceEngine::from_rules(vec![rule(&[
            ("os_family", "android"),
            ("kernel", "Linux"),
        ])]);
        // 'Android' != 'android': case-sensitive, rule does not match
        let out = engine.analyze(&rule(&[("os_family", "Android")]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_matching_rule_contributes_novel_keys() {
        let engine = InferenceEngine::from_rules(vec![rule(&[
            ("os_family", "Android"),
            ("kernel", "Linux"),
        ])]);
        let out = engine.analyze(&rule(&[("os_family", "Android")]));
        assert_eq!(out.len(), 1);
        assert_eq!(out["kernel"], "Linux");
    }

    #[test]
    fn test_known_keys_are_not_reinferred() {
        let engine = InferenceEngine::from_rules(vec![rule(&[
            ("os_family", "Android"),
            ("kernel", "Linux"),
        ])]);
        let out = engine.analyze(&rule(&[("os_family", "Android"), ("kernel", "XNU")]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_agreeing_candidates_reduce_to_common_prefix() {
        let engine = InferenceEngine::from_rules(vec![
            rule(&[("a", "1"), ("b", "foobar")]),
            rule(&[("a", "1"), ("b", "FooBaz")]),
        ]);
        let out = engine.analyze(&rule(&[("a", "1")]));
        // prefix keeps the later candidate's characters
        assert_eq!(out["b"], "FooBa");
    }

    #[test]
    fn test_disagreeing_candidates_drop_the_key() {
        // "foo" and "foobar" agree, but "baz" shares no prefix with the
        // stored "foo": the key is flagged and dropped at the end even
        // though earlier candidates agreed.
        let engine = InferenceEngine::from_rules(vec![
            rule(&[("a", "1"), ("b", "foo")]),
            rule(&[("a", "1"), ("b", "foobar")]),
            rule(&[("a", "1"), ("b", "baz")]),
        ]);
        let out = engine.analyze(&rule(&[("a", "1")]));
        assert!(!out.contains_key("b"));
    }

    #[test]
    fn test_flag_is_sticky_across_later_agreement() {
        // after the flag is set, a later candidate agreeing with the
        // stored value must not resurrect the key
        let engine = InferenceEngine::from_rules(vec![
            rule(&[("a", "1"), ("b", "foo")]),
            rule(&[("a", "1"), ("b", "baz")]),
            rule(&[("a", "1"), ("b", "foo")]),
        ]);
        let out = engine.analyze(&rule(&[("a", "1")]));
        assert!(!out.contains_key("b"));
    }

    #[test]
    fn test_unflagged_keys_survive_alongside_dropped_ones() {
        let engine = InferenceEngine::from_rules(vec![
            rule(&[("a", "1"), ("b", "foo"), ("c", "same")]),
            rule(&[("a", "1"), ("b", "baz"), ("c", "same")]),
        ]);
        let out = engine.analyze(&rule(&[("a", "1")]));
        assert!(!out.contains_key("b"));
        assert_eq!(out["c"], "same");
    }

    #[test]
    fn test_common_initial_substring() {
        assert_eq!(common_initial_substring("foobar", "FOOBAZ"), "fooba");
        assert_eq!(common_initial_substring("abc", "xyz"), "");
        assert_eq!(common_initial_substring("abc", "abcdef"), "abc");
    }
}
