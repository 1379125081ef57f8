//! CMI Rapid Response utilities for observation tables
//!
//! This library works with sparse observation-by-sample tables (OTU/ASV
//! tables) that carry per-observation and per-sample metadata.
//!
//! # Overview
//!
//! - **data**: Core data structures (Table, Axis, metadata values) and the
//!   `ObservationTable` trait exporters read through
//! - **export**: Text exports, currently taxonomy as `OBS_ID\tRANK; RANK; ...`
//!
//! # Example
//!
//! ```
//! use cmirr::prelude::*;
//!
//! let table = example_table().unwrap();
//! let mut out = Vec::new();
//! taxonomy_exporter(&table).write_to(&mut out).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "O1\tBacteria; Firmicutes\nO2\tBacteria; Bacteroidetes\n"
//! );
//! ```

pub mod data;
pub mod error;
pub mod export;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        example_table, Axis, MetadataRecord, MetadataValue, ObservationTable, Table,
    };
    pub use crate::error::{CmirrError, Result};
    pub use crate::export::{taxonomy_exporter, ExportConfig, TaxonomyExporter, ValidationPolicy};
}
