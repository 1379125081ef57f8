//! Taxonomy export: one `OBS_ID<TAB>RANK; RANK; ...` line per observation.

use crate::data::{Axis, ObservationTable};
use crate::error::{CmirrError, Result};
use crate::export::config::{ExportConfig, ValidationPolicy};
use std::io::Write;
use std::iter::FusedIterator;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Nothing has been read from the table yet.
    Pending,
    /// Validation passed; `next` is the position of the next observation.
    Streaming { next: usize },
    Done,
}

/// Lazy taxonomy export over an observation table.
///
/// Building the exporter reads nothing. The first call to `next` validates
/// the table according to the configured [`ValidationPolicy`]; if that fails
/// a single error is yielded and no lines follow.
/// Every later call reads and formats exactly one observation, so taking a
/// prefix costs only that prefix.
///
/// ```
/// use cmirr::data::example_table;
/// use cmirr::export::taxonomy_exporter;
///
/// let table = example_table().unwrap();
/// let lines: Vec<String> = taxonomy_exporter(&table)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(lines, ["O1\tBacteria; Firmicutes\n", "O2\tBacteria; Bacteroidetes\n"]);
/// ```
#[derive(Debug)]
pub struct TaxonomyExporter<'a, T: ObservationTable + ?Sized> {
    table: &'a T,
    config: ExportConfig,
    stage: Stage,
}

/// Export taxonomy from `table` with the default configuration.
pub fn taxonomy_exporter<T: ObservationTable + ?Sized>(table: &T) -> TaxonomyExporter<'_, T> {
    TaxonomyExporter::new(table)
}

impl<'a, T: ObservationTable + ?Sized> TaxonomyExporter<'a, T> {
    /// Create an exporter with the default configuration.
    pub fn new(table: &'a T) -> Self {
        Self::with_config(table, ExportConfig::default())
    }

    /// Create an exporter with an explicit configuration.
    pub fn with_config(table: &'a T, config: ExportConfig) -> Self {
        Self {
            table,
            config,
            stage: Stage::Pending,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Drain the exporter into `writer`, returning the number of lines written.
    ///
    /// Stops at the first error; lines before it have already been written.
    pub fn write_to<W: Write>(self, writer: &mut W) -> Result<usize> {
        let mut n_lines = 0;
        for line in self {
            writer.write_all(line?.as_bytes())?;
            n_lines += 1;
        }
        Ok(n_lines)
    }

    fn validate(&self) -> Result<()> {
        let records = self
            .table
            .axis_metadata(Axis::Observation)
            .ok_or(CmirrError::MissingTaxonomy)?;
        let field = self.config.field.as_str();

        match self.config.validation {
            ValidationPolicy::FirstObservation => match records.first() {
                Some(first) if first.contains_key(field) => Ok(()),
                _ => Err(CmirrError::MissingTaxonomy),
            },
            ValidationPolicy::AllObservations => {
                if records.is_empty() {
                    return Err(CmirrError::MissingTaxonomy);
                }
                // Per-ID lookup as in streaming; bulk records may not cover every ID
                for id in self.table.ids(Axis::Observation) {
                    let value = self
                        .table
                        .metadata(id, Axis::Observation)
                        .and_then(|record| record.get(field));
                    match value {
                        None => return Err(CmirrError::MissingTaxonomy),
                        Some(value) if value.as_ranks().is_none() => {
                            return Err(CmirrError::InvalidTaxonomy {
                                id: id.clone(),
                                field: field.to_string(),
                            })
                        }
                        Some(_) => {}
                    }
                }
                Ok(())
            }
        }
    }

    fn format_line(&self, id: &str) -> Result<String> {
        let field = self.config.field.as_str();
        let value = self
            .table
            .metadata(id, Axis::Observation)
            .and_then(|record| record.get(field))
            .ok_or_else(|| CmirrError::ObservationWithoutTaxonomy(id.to_string()))?;
        let ranks = value.as_ranks().ok_or_else(|| CmirrError::InvalidTaxonomy {
            id: id.to_string(),
            field: field.to_string(),
        })?;

        Ok(format!("{}\t{}\n", id, ranks.join(&self.config.separator)))
    }
}

impl<'a, T: ObservationTable + ?Sized> Iterator for TaxonomyExporter<'a, T> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stage == Stage::Pending {
            if let Err(e) = self.validate() {
                self.stage = Stage::Done;
                return Some(Err(e));
            }
            debug!(
                field = %self.config.field,
                policy = ?self.config.validation,
                "taxonomy validation passed"
            );
            self.stage = Stage::Streaming { next: 0 };
        }

        let Stage::Streaming { next } = self.stage else {
            return None;
        };

        let Some(id) = self.table.ids(Axis::Observation).get(next) else {
            debug!(lines = next, "taxonomy export complete");
            self.stage = Stage::Done;
            return None;
        };

        match self.format_line(id) {
            Ok(line) => {
                self.stage = Stage::Streaming { next: next + 1 };
                Some(Ok(line))
            }
            Err(e) => {
                warn!(observation = %id, error = %e, "stopping taxonomy export");
                self.stage = Stage::Done;
                Some(Err(e))
            }
        }
    }
}

impl<'a, T: ObservationTable + ?Sized> FusedIterator for TaxonomyExporter<'a, T> {}
