//! Runtime layer for the inspection dashboard.
//!
//! Owns the only I/O boundary (fetching the extract), the TTL snapshot cache,
//! and the background refresh loop feeding the UI.

pub mod data_manager;
pub mod orchestrator;
pub mod source;

pub use visa_core as core;
pub use visa_data as data;
