//! fse-enhance - price metrics for FS Economy assignment tables
//!
//! Reads a saved FS Economy page, finds its assignment and hold tables and
//! appends derived columns:
//!
//! - pay per NM per passenger (weight-based cargo, 77 kg a head) or per unit
//! - optionally, per-destination totals with the best sum per NM highlighted
//!
//! # Example
//!
//! ```no_run
//! use fse_enhance::config::EngineConfig;
//! use fse_enhance::core::Enhancer;
//!
//! # async fn run() -> fse_enhance::error::EnhanceResult<()> {
//! let html = std::fs::read_to_string("assignments.html")?;
//! let enhancer = Enhancer::new(EngineConfig::default());
//! let (tables, report) = enhancer.enhance_html(&html).await?;
//!
//! println!("Tables: {}", tables.len());
//! println!("Augmented: {}", report.augmented());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::{EngineConfig, MissingColumnPolicy};
pub use error::{EnhanceError, EnhanceResult};
pub use types::{Cell, ColumnIndex, Row, Table, TableKind};
