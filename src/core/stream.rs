//! Transport stream records
//!
//! A stream is one transport-level connection, identified by
//! (transport kind, stream id). Streams are created once per new id and
//! never deleted; the registry maps reference them for the session's
//! lifetime.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::packet::{PacketView, Transport};

/// Registry key for a stream: unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub transport: Transport,
    pub id: u64,
}

impl StreamKey {
    pub fn new(transport: Transport, id: u64) -> Self {
        Self { transport, id }
    }

    /// Key of the stream a packet belongs to
    pub fn from_packet(pkt: &dyn PacketView) -> Self {
        Self {
            transport: pkt.transport(),
            id: pkt.stream_id(),
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.transport, self.id)
    }
}

/// One observed transport stream with its endpoint addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub key: StreamKey,
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl Stream {
    /// Build the stream record from the first packet seen on it
    pub fn from_packet(pkt: &dyn PacketView) -> Self {
        Self {
            key: StreamKey::from_packet(pkt),
            src_ip: pkt.src_ip(),
            dst_ip: pkt.dst_ip(),
            src_port: pkt.src_port(),
            dst_port: pkt.dst_port(),
        }
    }
}
