//! Metric engine: extraction, per-row metric, destination totals

pub mod aggregate;
pub mod binder;
pub mod enhancer;
pub mod extract;
pub mod metrics;
pub mod sorter;

pub use enhancer::{EnhanceReport, Enhancer, TableReport, TableStatus};
pub use sorter::{InProcessSorter, SortCollaborator};
