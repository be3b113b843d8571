//! Device and service identity records
//!
//! Devices and services accumulate characteristics from many streams.
//! Matching is fuzzy: a candidate hint map is scored against stored
//! characteristics, any hard contradiction rejects the candidate, and
//! merges only ever replace a value with a strictly longer one.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::analyzers::inference::InferenceEngine;
use super::activity::ActivityLog;
use super::stream::{Stream, StreamKey};

/// Characteristic hint map extracted from one packet's evidence
pub type HintMap = BTreeMap<String, String>;

/// Score one stored attribute against a candidate string.
///
/// Returns 0 when the key carries no stored value (no evidence either way),
/// -1 on the first position where both characters are alphanumeric but
/// differ case-insensitively (hard contradiction), otherwise the fraction of
/// matching positions over the longer of the two strings.
pub fn similarity(stored: &HintMap, key: &str, candidate: &str) -> f64 {
    let current = match stored.get(key) {
        Some(v) => v,
        None => return 0.0,
    };

    let a: Vec<char> = current.chars().collect();
    let b: Vec<char> = candidate.chars().collect();
    let overlap = a.len().min(b.len());

    let mut count = 0usize;
    for i in 0..overlap {
        let both_symbol = !a[i].is_alphanumeric() && !b[i].is_alphanumeric();
        if both_symbol || a[i].eq_ignore_ascii_case(&b[i]) {
            count += 1;
        } else {
            return -1.0;
        }
    }

    count as f64 / a.len().max(b.len()) as f64
}

/// Merge incoming hints into a characteristics map.
///
/// A key is written when absent, or when the incoming value is strictly
/// longer than the stored one. Values never shrink.
pub(crate) fn merge_longer(current: &mut HintMap, incoming: &HintMap) {
    for (key, value) in incoming {
        match current.get(key) {
            Some(existing) if value.len() <= existing.len() => {}
            _ => {
                current.insert(key.clone(), value.clone());
            }
        }
    }
}

/// An inferred application or destination-service record
///
/// Owned by a device once matched to one; held by the session registry
/// alone while authorless (classified purely by destination identity).
#[derive(Debug, Clone, Default)]
pub struct Service {
    pub characteristics: HintMap,
    pub activity: ActivityLog,
    /// Streams whose traffic fed this service
    pub streams: Vec<StreamKey>,
}

impl Service {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service known only by its destination-derived name
    pub fn named(name: &str) -> Self {
        let mut service = Self::default();
        service
            .characteristics
            .insert("name".to_string(), name.to_string());
        service
    }

    /// Service seeded from a catalog's static characteristics
    pub fn from_characteristics(characteristics: HintMap) -> Self {
        Self {
            characteristics,
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.characteristics.get("name").map(|s| s.as_str())
    }

    /// Merge app-level hints, longer value wins
    pub fn update(&mut self, app_args: &HintMap) {
        merge_longer(&mut self.characteristics, app_args);
    }

    /// Remember a stream as belonging to this service
    pub fn add_stream(&mut self, key: StreamKey) {
        if !self.streams.contains(&key) {
            self.streams.push(key);
        }
    }
}

/// An inferred physical/user endpoint inventory record
///
/// Devices are created when no existing device is a compatible match for
/// new evidence; they are never merged or destroyed during a session.
#[derive(Debug, Clone, Default)]
pub struct Device {
    pub characteristics: HintMap,
    pub streams: Vec<Stream>,
    pub services: Vec<Service>,
    pub activity: ActivityLog,
    /// Which owned service each bound stream feeds, by stream key
    stream_services: HashMap<StreamKey, usize>,
}

impl Device {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score this device against one packet's hint maps.
    ///
    /// Any contradiction on a device-level key rejects the device outright.
    /// App-level keys are scored against every owned service; a
    /// contradiction there only excludes that term from the sum.
    pub fn match_score(&self, device_args: &HintMap, app_args: &HintMap) -> f64 {
        let mut score = 0.0;

        for (key, value) in device_args {
            let sim = similarity(&self.characteristics, key, value);
            if sim == -1.0 {
                return -1.0;
            }
            score += sim;
        }

        for service in &self.services {
            for (key, value) in app_args {
                let sim = similarity(&service.characteristics, key, value);
                if sim != -1.0 {
                    score += sim;
                }
            }
        }

        score
    }

    /// Apply one packet's evidence: merge device hints, run inference,
    /// record activity and route app hints to the best-matching service.
    pub fn update(
        &mut self,
        device_args: &HintMap,
        app_args: &HintMap,
        samples: &[(DateTime<Utc>, u64)],
        stream: StreamKey,
        inference: &InferenceEngine,
        rng: &mut impl Rng,
    ) {
        self.update_device(device_args, inference);
        self.activity.extend(samples);
        self.update_services(app_args, samples, stream, rng);
    }

    /// Merge device-level hints, then fold in inferred characteristics
    pub fn update_device(&mut self, device_args: &HintMap, inference: &InferenceEngine) {
        merge_longer(&mut self.characteristics, device_args);

        let inferred = inference.analyze(&self.characteristics);
        merge_longer(&mut self.characteristics, &inferred);
    }

    /// Select the owned service the app hints describe, or create one.
    ///
    /// Candidates need a strictly positive score; ties are broken uniformly
    /// at random. Empty hint maps never spawn an empty service.
    fn update_services(
        &mut self,
        app_args: &HintMap,
        samples: &[(DateTime<Utc>, u64)],
        stream: StreamKey,
        rng: &mut impl Rng,
    ) {
        let mut max_score = f64::NEG_INFINITY;
        let mut candidates: Vec<usize> = Vec::new();

        for (idx, service) in self.services.iter().enumerate() {
            let mut score = 0.0;
            let mut incompatible = false;
            for (key, value) in app_args {
                let sim = similarity(&service.characteristics, key, value);
                if sim == -1.0 {
                    incompatible = true;
                    break;
                }
                score += sim;
            }
            if incompatible {
                continue;
            }
            if score > 0.0 {
                if score == max_score {
                    candidates.push(idx);
                } else if score > max_score {
                    max_score = score;
                    candidates = vec![idx];
                }
            }
        }

        let selected = if !candidates.is_empty() {
            candidates.choose(rng).copied()
        } else if !app_args.is_empty() {
            self.services.push(Service::new());
            Some(self.services.len() - 1)
        } else {
            None
        };

        if let Some(idx) = selected {
            let service = &mut self.services[idx];
            service.update(app_args);
            service.activity.extend(samples);
            service.add_stream(stream);
            self.stream_services.insert(stream, idx);
        }
    }

    /// The owned service a bound stream feeds, if any
    pub fn service_for_stream(&mut self, key: StreamKey) -> Option<&mut Service> {
        let idx = *self.stream_services.get(&key)?;
        self.services.get_mut(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::packet::Transport;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hints(pairs: &[(&str, &str)]) -> HintMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn key(id: u64) -> StreamKey {
        StreamKey::new(Transport::Tcp, id)
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_similarity_missing_key_is_neutral() {
        let stored = hints(&[("os_family", "Android")]);
        assert_eq!(similarity(&stored, "brand", "Samsung"), 0.0);
    }

    #[test]
    fn test_similarity_contradiction() {
        let stored = hints(&[("v", "abc")]);
        assert_eq!(similarity(&stored, "v", "ABD"), -1.0);
    }

    #[test]
    fn test_similarity_prefix_fraction() {
        let stored = hints(&[("v", "abc")]);
        assert_eq!(similarity(&stored, "v", "abc123"), 0.5);
    }

    #[test]
    fn test_similarity_case_insensitive_full_match() {
        let stored = hints(&[("os_family", "android")]);
        assert_eq!(similarity(&stored, "os_family", "Android"), 1.0);
    }

    #[test]
    fn test_similarity_symbols_match_each_other() {
        let stored = hints(&[("os_version", "10.1")]);
        // '.' vs '_' both non-alphanumeric: counts as a match
        assert_eq!(similarity(&stored, "os_version", "10_1"), 1.0);
    }

    #[test]
    fn test_merge_longer_wins() {
        let mut current = hints(&[("os_version", "10")]);
        merge_longer(&mut current, &hints(&[("os_version", "10.1.2")]));
        assert_eq!(current["os_version"], "10.1.2");

        merge_longer(&mut current, &hints(&[("os_version", "9")]));
        assert_eq!(current["os_version"], "10.1.2");

        // equal length keeps the stored value
        merge_longer(&mut current, &hints(&[("os_version", "11.1.9")]));
        assert_eq!(current["os_version"], "10.1.2");
    }

    #[test]
    fn test_match_score_contradiction_rejects_device() {
        let engine = InferenceEngine::from_rules(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let mut android = Device::new();
        android.update(
            &hints(&[("os_family", "Android")]),
            &HintMap::new(),
            &[],
            key(1),
            &engine,
            &mut rng,
        );
        let mut ios = Device::new();
        ios.update(
            &hints(&[("os_family", "iOS")]),
            &HintMap::new(),
            &[],
            key(2),
            &engine,
            &mut rng,
        );

        let candidate = hints(&[("os_family", "android")]);
        assert_eq!(ios.match_score(&candidate, &HintMap::new()), -1.0);
        assert!(android.match_score(&candidate, &HintMap::new()) > 0.0);
    }

    #[test]
    fn test_match_score_service_contradiction_does_not_reject() {
        let engine = InferenceEngine::from_rules(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let mut device = Device::new();
        device.update(
            &hints(&[("os_family", "Android")]),
            &hints(&[("name", "Spotify")]),
            &[],
            key(1),
            &engine,
            &mut rng,
        );

        // app hint contradicts the owned service but agrees with the device
        let score = device.match_score(
            &hints(&[("os_family", "Android")]),
            &hints(&[("name", "Chrome")]),
        );
        assert!(score > 0.0);
    }

    #[test]
    fn test_empty_app_hints_spawn_no_service() {
        let engine = InferenceEngine::from_rules(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let mut device = Device::new();
        device.update(
            &hints(&[("os_family", "Android")]),
            &HintMap::new(),
            &[(ts(), 64)],
            key(1),
            &engine,
            &mut rng,
        );
        assert!(device.services.is_empty());
        assert_eq!(device.activity.total_bytes(), 64);
    }

    #[test]
    fn test_matching_app_hints_reuse_service() {
        let engine = InferenceEngine::from_rules(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let mut device = Device::new();
        device.update(
            &HintMap::new(),
            &hints(&[("name", "Spotify")]),
            &[(ts(), 100)],
            key(1),
            &engine,
            &mut rng,
        );
        device.update(
            &HintMap::new(),
            &hints(&[("name", "Spotify"), ("version", "8.9")]),
            &[(ts(), 50)],
            key(2),
            &engine,
            &mut rng,
        );

        assert_eq!(device.services.len(), 1);
        let service = &device.services[0];
        assert_eq!(service.characteristics["version"], "8.9");
        assert_eq!(service.activity.total_bytes(), 150);
    }

    #[test]
    fn test_incompatible_app_hints_spawn_second_service() {
        let engine = InferenceEngine::from_rules(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let mut device = Device::new();
        device.update(
            &HintMap::new(),
            &hints(&[("name", "Spotify")]),
            &[],
            key(1),
            &engine,
            &mut rng,
        );
        device.update(
            &HintMap::new(),
            &hints(&[("name", "Chrome")]),
            &[],
            key(2),
            &engine,
            &mut rng,
        );

        assert_eq!(device.services.len(), 2);
    }

    #[test]
    fn test_stream_service_binding() {
        let engine = InferenceEngine::from_rules(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);

        let mut device = Device::new();
        device.update(
            &HintMap::new(),
            &hints(&[("name", "Spotify")]),
            &[],
            key(9),
            &engine,
            &mut rng,
        );

        assert!(device.service_for_stream(key(9)).is_some());
        assert!(device.service_for_stream(key(10)).is_none());
    }
}
