//! Data structures for observation tables.

mod metadata;
mod table;

pub use metadata::{Axis, MetadataRecord, MetadataValue};
pub use table::{example_table, ObservationTable, Table};
