//! HTTP handler
//!
//! The only source of device evidence. User-agent hints bind streams to
//! devices permanently; a destination-classified authorless service on the
//! same stream is discarded first, since device evidence supersedes bare
//! destination identity.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::analyzers::UaHints;
use crate::core::device::Device;
use crate::core::packet::{PacketView, Transport};
use crate::core::stream::{Stream, StreamKey};
use crate::session::registry::DeviceId;
use crate::session::Environment;

pub(crate) fn process(env: &mut Environment, pkt: &dyn PacketView) {
    // some dissectors stack HTTP over other transports; only TCP streams
    // participate in correlation
    if pkt.transport() != Transport::Tcp {
        return;
    }
    let key = StreamKey::from_packet(pkt);

    evict_authorless(env, key);

    if let Some(device_id) = env.registry.device_for(key) {
        process_existing(env, pkt, key, device_id);
    } else if pkt.is_http_request() {
        process_new(env, pkt, key);
    }
}

/// Device evidence on a stream discards its destination-derived service
/// outright; the service is removed, not converted.
fn evict_authorless(env: &mut Environment, key: StreamKey) {
    if let Some(service_id) = env.registry.service_for(key) {
        if let Some(service) = env.remove_authorless(service_id) {
            debug!(
                service = service.name().unwrap_or("?"),
                stream = %key,
                "discarding authorless service, stream carries device evidence"
            );
        }
        env.registry.purge_service(service_id);
    }
}

fn process_existing(env: &mut Environment, pkt: &dyn PacketView, key: StreamKey, device_id: DeviceId) {
    match pkt.user_agent() {
        Some(user_agent) => analyze_user_agent(env, user_agent, pkt, key, Some(device_id)),
        None => {
            let device = &mut env.devices[device_id.0];
            device.activity.record(pkt.timestamp(), pkt.byte_len());
            if let Some(service) = device.service_for_stream(key) {
                service.activity.record(pkt.timestamp(), pkt.byte_len());
            }
        }
    }
}

fn process_new(env: &mut Environment, pkt: &dyn PacketView, key: StreamKey) {
    if let Some(user_agent) = pkt.user_agent() {
        analyze_user_agent(env, user_agent, pkt, key, None);
    }
}

/// Run the user-agent analyzer and apply its evidence.
///
/// An already-bound device is refined in place (the device itself is never
/// re-matched); an unbound stream goes through the device pool match and
/// is then permanently bound.
fn analyze_user_agent(
    env: &mut Environment,
    user_agent: &str,
    pkt: &dyn PacketView,
    key: StreamKey,
    bound: Option<DeviceId>,
) {
    let hints = env.ua.get_best_match(user_agent);
    if hints.is_empty() {
        return;
    }

    match bound {
        Some(device_id) => {
            let device = &mut env.devices[device_id.0];
            device.update(
                &hints.device_args,
                &hints.app_args,
                &[(pkt.timestamp(), pkt.byte_len())],
                key,
                &env.inference,
                &mut env.rng,
            );
        }
        None => {
            let device_id = create_or_update_device(env, &hints, pkt, key);
            env.devices[device_id.0].streams.push(Stream::from_packet(pkt));
            env.registry.bind_device(key, device_id);
        }
    }
}

/// Pick the best-scoring compatible device or create a new one, then merge
/// the evidence and replay any buffered temporal samples for this stream.
///
/// The equal-score branch only collects ties while the best score is
/// positive; an all-zero field never produces candidates.
fn create_or_update_device(
    env: &mut Environment,
    hints: &UaHints,
    pkt: &dyn PacketView,
    key: StreamKey,
) -> DeviceId {
    let mut max_score = 0.0_f64;
    let mut candidates: Vec<usize> = Vec::new();

    for (idx, device) in env.devices.iter().enumerate() {
        let score = device.match_score(&hints.device_args, &hints.app_args);
        if max_score > 0.0 && score == max_score {
            candidates.push(idx);
        } else if score > max_score {
            max_score = score;
            candidates = vec![idx];
        }
    }

    let device_id = match candidates.choose(&mut env.rng).copied() {
        Some(idx) => DeviceId(idx),
        None => env.create_device(),
    };

    let mut samples = vec![(pkt.timestamp(), pkt.byte_len())];
    if let Some(buffered) = env.registry.take_temporal(key) {
        samples.extend(buffered);
    }

    let device: &mut Device = &mut env.devices[device_id.0];
    device.update(
        &hints.device_args,
        &hints.app_args,
        &samples,
        key,
        &env.inference,
        &mut env.rng,
    );

    device_id
}
