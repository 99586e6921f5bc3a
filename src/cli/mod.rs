//! CLI command handlers

pub mod commands;

pub use commands::{augment, inspect, watch, AugmentOptions, OutputFormat};
