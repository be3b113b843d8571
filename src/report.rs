//! Session snapshot
//!
//! Serializable view of everything a session inferred: devices with their
//! owned services and activity, plus any authorless services that survived
//! to the end of the capture. Emission format is the caller's concern.

use serde::Serialize;

use crate::core::activity::ActivityLog;
use crate::core::device::{Device, HintMap, Service};
use crate::core::stream::{Stream, StreamKey};
use crate::session::Environment;

/// Per-session snapshot of all inferred identities
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub devices: Vec<DeviceReport>,
    pub authorless_services: Vec<ServiceReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub characteristics: HintMap,
    pub streams: Vec<Stream>,
    pub services: Vec<ServiceReport>,
    pub activity: ActivityLog,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub characteristics: HintMap,
    pub streams: Vec<StreamKey>,
    pub activity: ActivityLog,
}

impl SessionReport {
    pub fn from_session(env: &Environment) -> Self {
        Self {
            devices: env.devices().iter().map(DeviceReport::from_device).collect(),
            authorless_services: env
                .authorless_services()
                .map(ServiceReport::from_service)
                .collect(),
        }
    }
}

impl DeviceReport {
    fn from_device(device: &Device) -> Self {
        Self {
            characteristics: device.characteristics.clone(),
            streams: device.streams.clone(),
            services: device.services.iter().map(ServiceReport::from_service).collect(),
            activity: device.activity.clone(),
        }
    }
}

impl ServiceReport {
    fn from_service(service: &Service) -> Self {
        Self {
            characteristics: service.characteristics.clone(),
            streams: service.streams.clone(),
            activity: service.activity.clone(),
        }
    }
}
