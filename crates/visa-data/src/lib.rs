//! Data layer for the inspection dashboard.
//!
//! Parses the delimited extract, normalizes it into canonical inspection
//! records, expands team visits per inspector, filters both tables against a
//! selection, and derives every table the dashboard shows.

pub mod aggregator;
pub mod analysis;
pub mod expander;
pub mod export;
pub mod filter;
pub mod normalizer;
pub mod reader;
pub mod schema;

pub use visa_core as core;
