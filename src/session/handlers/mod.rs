//! Per-layer protocol handlers
//!
//! Each handler advances the per-stream state machine:
//! unclassified → temporal → authorless-service → device-bound.
//! Transitions are one-directional, except that device evidence discards
//! an authorless service instead of converting it.

pub mod dns;
pub mod http;
pub mod tcp;
