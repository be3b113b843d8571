//! Packet field accessor contract
//!
//! The session core never dissects packets itself. It consumes
//! already-dissected fields through `PacketView`, asking only yes/no
//! questions about optional layers. `PacketRecord` is the serde-backed
//! realization used by the binary and the tests.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport protocol carrying a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Tcp => write!(f, "TCP"),
            Transport::Udp => write!(f, "UDP"),
        }
    }
}

/// Top application layer of a dissected packet
///
/// Dispatch is keyed on this tag, not on layer-name strings. Anything the
/// session does not correlate arrives as `Ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLayer {
    Http,
    Dns,
    Tcp,
    Ignored,
}

impl Default for AppLayer {
    fn default() -> Self {
        AppLayer::Ignored
    }
}

/// Read-only view over one dissected packet
///
/// Optional layers are surfaced as `Option`/empty-slice accessors; a missing
/// field is "no new evidence", never an error.
pub trait PacketView {
    /// Top-of-stack application layer used for dispatch
    fn app_layer(&self) -> AppLayer;

    /// Transport carrying this packet
    fn transport(&self) -> Transport;

    /// Transport stream identifier, unique within the session per transport
    fn stream_id(&self) -> u64;

    fn src_ip(&self) -> IpAddr;
    fn dst_ip(&self) -> IpAddr;
    fn src_port(&self) -> u16;
    fn dst_port(&self) -> u16;

    /// Capture timestamp
    fn timestamp(&self) -> DateTime<Utc>;

    /// On-wire byte length
    fn byte_len(&self) -> u64;

    /// HTTP User-Agent header, when the packet carries one
    fn user_agent(&self) -> Option<&str> {
        None
    }

    /// Whether the packet is an HTTP request
    fn is_http_request(&self) -> bool {
        false
    }

    /// DNS query name, present on both queries and responses
    fn dns_query(&self) -> Option<&str> {
        None
    }

    /// Resolved addresses of a DNS response; empty for queries
    fn dns_answers(&self) -> &[IpAddr] {
        &[]
    }
}

/// HTTP fields of a dissected packet record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpFields {
    /// True for request packets
    #[serde(default)]
    pub request: bool,
    /// User-Agent header value, if present
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// DNS fields of a dissected packet record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsFields {
    /// Query name
    #[serde(default)]
    pub query: Option<String>,
    /// Answer addresses; empty for queries
    #[serde(default)]
    pub answers: Vec<IpAddr>,
}

/// One dissected packet, as produced by an external dissector
///
/// Deserialized from JSON lines by the binary; tests construct records
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketRecord {
    pub timestamp: DateTime<Utc>,
    pub length: u64,
    pub transport: Transport,
    pub stream_id: u64,
    pub src_ip: IpAddr,
    pub dst_ip: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    /// Top application layer; defaults to `ignored`
    #[serde(default)]
    pub layer: AppLayer,
    #[serde(default)]
    pub http: Option<HttpFields>,
    #[serde(default)]
    pub dns: Option<DnsFields>,
}

impl PacketView for PacketRecord {
    fn app_layer(&self) -> AppLayer {
        self.layer
    }

    fn transport(&self) -> Transport {
        self.transport
    }

    fn stream_id(&self) -> u64 {
        self.stream_id
    }

    fn src_ip(&self) -> IpAddr {
        self.src_ip
    }

    fn dst_ip(&self) -> IpAddr {
        self.dst_ip
    }

    fn src_port(&self) -> u16 {
        self.src_port
    }

    fn dst_port(&self) -> u16 {
        self.dst_port
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn byte_len(&self) -> u64 {
        self.length
    }

    fn user_agent(&self) -> Option<&str> {
        self.http.as_ref().and_then(|h| h.user_agent.as_deref())
    }

    fn is_http_request(&self) -> bool {
        self.http.as_ref().map(|h| h.request).unwrap_or(false)
    }

    fn dns_query(&self) -> Option<&str> {
        self.dns.as_ref().and_then(|d| d.query.as_deref())
    }

    fn dns_answers(&self) -> &[IpAddr] {
        self.dns.as_ref().map(|d| d.answers.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_optional_fields_absent() {
        let json = r#"{
            "timestamp": "2026-03-01T10:00:00Z",
            "length": 120,
            "transport": "tcp",
            "stream_id": 4,
            "src_ip": "192.168.1.10",
            "dst_ip": "151.101.1.140",
            "src_port": 51234,
            "dst_port": 443
        }"#;
        let rec: PacketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.app_layer(), AppLayer::Ignored);
        assert!(rec.user_agent().is_none());
        assert!(!rec.is_http_request());
        assert!(rec.dns_answers().is_empty());
    }

    #[test]
    fn test_record_http_fields() {
        let json = r#"{
            "timestamp": "2026-03-01T10:00:00Z",
            "length": 420,
            "transport": "tcp",
            "stream_id": 7,
            "src_ip": "192.168.1.10",
            "dst_ip": "93.184.216.34",
            "src_port": 51234,
            "dst_port": 80,
            "layer": "http",
            "http": { "request": true, "user_agent": "curl/8.5.0" }
        }"#;
        let rec: PacketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.app_layer(), AppLayer::Http);
        assert!(rec.is_http_request());
        assert_eq!(rec.user_agent(), Some("curl/8.5.0"));
    }
}
