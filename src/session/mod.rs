//! Session environment
//!
//! Owns every map and table of one capture session and dispatches each
//! dissected packet to the handler for its application layer. Sessions are
//! single-threaded and strictly ordered: one packet's processing completes
//! before the next begins.

pub mod handlers;
pub mod registry;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::analyzers::{InferenceEngine, ServiceCatalog, UserAgentAnalyzer};
use crate::core::device::{Device, Service};
use crate::core::packet::{AppLayer, PacketView};
use crate::report::SessionReport;
use registry::{DeviceId, ServiceId, StreamRegistry};

/// All state of one capture session
pub struct Environment {
    pub(crate) catalog: ServiceCatalog,
    pub(crate) ua: UserAgentAnalyzer,
    pub(crate) inference: InferenceEngine,
    pub(crate) devices: Vec<Device>,
    pub(crate) authorless: BTreeMap<ServiceId, Service>,
    pub(crate) registry: StreamRegistry,
    pub(crate) rng: StdRng,
    next_service_id: u64,
}

impl Environment {
    /// Build the session context; a seed makes tie-breaking reproducible
    pub fn new(
        catalog: ServiceCatalog,
        ua: UserAgentAnalyzer,
        inference: InferenceEngine,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            services = catalog.len(),
            inference_rules = inference.len(),
            "session environment ready"
        );
        Self {
            catalog,
            ua,
            inference,
            devices: Vec::new(),
            authorless: BTreeMap::new(),
            registry: StreamRegistry::new(),
            rng,
            next_service_id: 0,
        }
    }

    /// Consume one packet, in capture order
    pub fn update(&mut self, pkt: &dyn PacketView) {
        match pkt.app_layer() {
            AppLayer::Http => handlers::http::process(self, pkt),
            AppLayer::Dns => handlers::dns::process(self, pkt),
            AppLayer::Tcp => handlers::tcp::process(self, pkt),
            AppLayer::Ignored => {}
        }
    }

    /// Devices inferred so far
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Surviving authorless services
    pub fn authorless_services(&self) -> impl Iterator<Item = &Service> {
        self.authorless.values()
    }

    /// Snapshot of the session suitable for serialization
    pub fn report(&self) -> SessionReport {
        SessionReport::from_session(self)
    }

    pub(crate) fn create_device(&mut self) -> DeviceId {
        self.devices.push(Device::new());
        debug!(device = self.devices.len() - 1, "created device");
        DeviceId(self.devices.len() - 1)
    }

    pub(crate) fn insert_authorless(&mut self, service: Service) -> ServiceId {
        let id = ServiceId(self.next_service_id);
        self.next_service_id += 1;
        self.authorless.insert(id, service);
        id
    }

    pub(crate) fn authorless_by_name(&self, name: &str) -> Option<ServiceId> {
        self.authorless
            .iter()
            .find(|(_, service)| service.name() == Some(name))
            .map(|(id, _)| *id)
    }

    pub(crate) fn remove_authorless(&mut self, id: ServiceId) -> Option<Service> {
        self.authorless.remove(&id)
    }
}
