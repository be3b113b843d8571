//! Plain-TCP handler
//!
//! Attributes traffic on already-classified streams and classifies new
//! streams by destination identity: first the CIDR tables, then the
//! reverse-DNS cache. Streams with no classifiable destination buffer
//! their samples until HTTP evidence arrives.

use std::net::IpAddr;

use tracing::debug;

use crate::core::packet::PacketView;
use crate::core::stream::StreamKey;
use crate::session::Environment;

pub(crate) fn process(env: &mut Environment, pkt: &dyn PacketView) {
    let key = StreamKey::from_packet(pkt);
    if env.registry.is_known(key) {
        process_existing(env, pkt, key);
    } else {
        process_new(env, pkt, key);
    }
}

fn process_existing(env: &mut Environment, pkt: &dyn PacketView, key: StreamKey) {
    let timestamp = pkt.timestamp();
    let bytes = pkt.byte_len();

    if let Some(device_id) = env.registry.device_for(key) {
        let device = &mut env.devices[device_id.0];
        device.activity.record(timestamp, bytes);
        if let Some(service) = device.service_for_stream(key) {
            service.activity.record(timestamp, bytes);
        }
    } else if let Some(service_id) = env.registry.service_for(key) {
        if let Some(service) = env.authorless.get_mut(&service_id) {
            service.activity.record(timestamp, bytes);
        }
    } else {
        env.registry.push_temporal(key, (timestamp, bytes));
    }
}

fn process_new(env: &mut Environment, pkt: &dyn PacketView, key: StreamKey) {
    let dst = pkt.dst_ip();

    let mut name = env.catalog.find_service_from_ip(dst);
    if name.is_none() {
        name = resolve_host(env, dst);
    }

    match name {
        Some(name) => bind_authorless(env, &name, pkt, key),
        None => env.registry.push_temporal(key, (pkt.timestamp(), pkt.byte_len())),
    }
}

/// Reverse-DNS fallback: refine the cached hostname through the URL tables
/// before falling back to the bare hostname as the service name
fn resolve_host(env: &mut Environment, dst: IpAddr) -> Option<String> {
    let host = env.registry.host_for(dst)?.to_string();

    if let Some(name) = env.catalog.find_service_from_absolute_url(&host) {
        return Some(name);
    }
    if let Some(name) = env.catalog.find_service_from_url(&host) {
        return Some(name);
    }
    Some(host)
}

fn bind_authorless(env: &mut Environment, name: &str, pkt: &dyn PacketView, key: StreamKey) {
    let service_id = match env.authorless_by_name(name) {
        Some(id) => id,
        None => {
            debug!(service = name, stream = %key, "authorless service from destination");
            let record = env.catalog.service_record(name);
            env.insert_authorless(record)
        }
    };

    if let Some(service) = env.authorless.get_mut(&service_id) {
        service.activity.record(pkt.timestamp(), pkt.byte_len());
        service.add_stream(key);
    }
    env.registry.bind_service(key, service_id);
}
