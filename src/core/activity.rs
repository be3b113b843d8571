//! Activity timelines
//!
//! Devices and services accumulate observed traffic into per-second
//! buckets keyed by a formatted timestamp string.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bucket key format, second granularity
const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time-bucketed byte counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    buckets: BTreeMap<String, u64>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample; byte counts accumulate within a second bucket
    pub fn record(&mut self, timestamp: DateTime<Utc>, bytes: u64) {
        let bucket = timestamp.format(BUCKET_FORMAT).to_string();
        *self.buckets.entry(bucket).or_insert(0) += bytes;
    }

    /// Add a batch of samples, e.g. a replayed temporal buffer
    pub fn extend(&mut self, samples: &[(DateTime<Utc>, u64)]) {
        for &(ts, bytes) in samples {
            self.record(ts, bytes);
        }
    }

    /// Total bytes across all buckets
    pub fn total_bytes(&self) -> u64 {
        self.buckets.values().sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, bucket: &str) -> Option<u64> {
        self.buckets.get(bucket).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
