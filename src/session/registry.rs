//! Stream registry
//!
//! Per-transport maps from stream key to classification state, plus the
//! reverse-DNS address cache. A stream is in at most one meaningful state
//! for the device/service pair: a device binding supersedes a service
//! binding, and temporal buffers are consumed on classification.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};

use crate::core::stream::StreamKey;

/// Index of a device in the session's device list; devices are append-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub usize);

/// Session-unique identifier of an authorless service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub u64);

/// One buffered pre-classification sample
pub type Sample = (DateTime<Utc>, u64);

/// Classification state per stream
#[derive(Debug, Default)]
pub struct StreamRegistry {
    device_streams: HashMap<StreamKey, DeviceId>,
    service_streams: HashMap<StreamKey, ServiceId>,
    temporal_streams: HashMap<StreamKey, Vec<Sample>>,
    address_host: HashMap<IpAddr, String>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the stream has been seen in any state
    pub fn is_known(&self, key: StreamKey) -> bool {
        self.device_streams.contains_key(&key)
            || self.service_streams.contains_key(&key)
            || self.temporal_streams.contains_key(&key)
    }

    pub fn device_for(&self, key: StreamKey) -> Option<DeviceId> {
        self.device_streams.get(&key).copied()
    }

    pub fn bind_device(&mut self, key: StreamKey, device: DeviceId) {
        self.device_streams.insert(key, device);
    }

    pub fn service_for(&self, key: StreamKey) -> Option<ServiceId> {
        self.service_streams.get(&key).copied()
    }

    pub fn bind_service(&mut self, key: StreamKey, service: ServiceId) {
        self.service_streams.insert(key, service);
    }

    /// Drop every stream binding that points at a removed service
    pub fn purge_service(&mut self, service: ServiceId) {
        self.service_streams.retain(|_, bound| *bound != service);
    }

    /// Buffer a sample for a stream that cannot be classified yet
    pub fn push_temporal(&mut self, key: StreamKey, sample: Sample) {
        self.temporal_streams.entry(key).or_default().push(sample);
    }

    pub fn has_temporal(&self, key: StreamKey) -> bool {
        self.temporal_streams.contains_key(&key)
    }

    /// Consume the buffered samples on classification
    pub fn take_temporal(&mut self, key: StreamKey) -> Option<Vec<Sample>> {
        self.temporal_streams.remove(&key)
    }

    /// Record a resolved address → query name mapping; last writer wins
    pub fn record_host(&mut self, addr: IpAddr, host: &str) {
        self.address_host.insert(addr, host.to_string());
    }

    pub fn host_for(&self, addr: IpAddr) -> Option<&str> {
        self.address_host.get(&addr).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::packet::Transport;
    use chrono::TimeZone;

    fn key(id: u64) -> StreamKey {
        StreamKey::new(Transport::Tcp, id)
    }

    fn sample() -> Sample {
        (Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(), 64)
    }

    #[test]
    fn test_purge_removes_every_binding() {
        let mut registry = StreamRegistry::new();
        registry.bind_service(key(1), ServiceId(5));
        registry.bind_service(key(2), ServiceId(5));
        registry.bind_service(key(3), ServiceId(6));

        registry.purge_service(ServiceId(5));

        assert!(registry.service_for(key(1)).is_none());
        assert!(registry.service_for(key(2)).is_none());
        assert_eq!(registry.service_for(key(3)), Some(ServiceId(6)));
    }

    #[test]
    fn test_temporal_buffer_is_consumed() {
        let mut registry = StreamRegistry::new();
        registry.push_temporal(key(1), sample());
        registry.push_temporal(key(1), sample());

        let buffered = registry.take_temporal(key(1)).unwrap();
        assert_eq!(buffered.len(), 2);
        assert!(!registry.is_known(key(1)));
    }

    #[test]
    fn test_host_cache_last_writer_wins() {
        let mut registry = StreamRegistry::new();
        let addr: IpAddr = "151.101.1.140".parse().unwrap();
        registry.record_host(addr, "a.example.com");
        registry.record_host(addr, "b.example.com");

        assert_eq!(registry.host_for(addr), Some("b.example.com"));
    }
}
