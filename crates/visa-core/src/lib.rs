pub mod error;
pub mod formatting;
pub mod models;
pub mod selection;
pub mod settings;
pub mod time_utils;
