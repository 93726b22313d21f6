//! Terminal UI layer for the inspection dashboard.
//!
//! Provides themes, the header and release-rate bar components, table and
//! dashboard views, and the tabbed application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod table_view;
pub mod themes;

pub use visa_core as core;
