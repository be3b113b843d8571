//! Core data model
//!
//! Packet field access, transport streams, activity timelines and the
//! device/service identity records everything else mutates.

pub mod activity;
pub mod device;
pub mod packet;
pub mod stream;

pub use activity::ActivityLog;
pub use device::{similarity, Device, HintMap, Service};
pub use packet::{AppLayer, PacketRecord, PacketView, Transport};
pub use stream::{Stream, StreamKey};
