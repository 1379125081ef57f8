//! Text exports of table annotations.

mod config;
mod taxonomy;

pub use config::{ExportConfig, ValidationPolicy};
pub use taxonomy::{taxonomy_exporter, TaxonomyExporter};
