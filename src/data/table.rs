//! Observation table with sparse storage and per-axis metadata.

use crate::data::metadata::{Axis, MetadataRecord, MetadataValue};
use crate::error::{CmirrError, Result};
use sprs::{CsMat, TriMat};
use std::collections::HashMap;

/// Read access to an observation-by-sample table.
///
/// This is everything the exporters need from a table: ordered IDs per axis,
/// bulk metadata per axis and metadata lookup by ID.
pub trait ObservationTable {
    /// Identifiers along `axis`, in the table's canonical order.
    fn ids(&self, axis: Axis) -> &[String];

    /// Metadata for every ID along `axis`, in `ids(axis)` order.
    ///
    /// Returns `None` if the axis carries no metadata.
    fn axis_metadata(&self, axis: Axis) -> Option<&[MetadataRecord]>;

    /// Metadata for a single ID along `axis`.
    fn metadata(&self, id: &str, axis: Axis) -> Option<&MetadataRecord>;
}

/// A sparse table of counts with observation and sample annotations.
///
/// Rows are observations (OTUs, ASVs, genes), columns are samples.
/// Counts are held in CSR format.
#[derive(Debug, Clone)]
pub struct Table {
    /// Sparse matrix in CSR format (observations × samples)
    data: CsMat<u64>,
    observation_ids: Vec<String>,
    sample_ids: Vec<String>,
    observation_index: HashMap<String, usize>,
    sample_index: HashMap<String, usize>,
    observation_metadata: Option<Vec<MetadataRecord>>,
    sample_metadata: Option<Vec<MetadataRecord>>,
}

impl Table {
    /// Create a new Table from a sparse matrix and identifiers.
    ///
    /// IDs must be unique within each axis.
    pub fn new(
        data: CsMat<u64>,
        observation_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != observation_ids.len() {
            return Err(CmirrError::DimensionMismatch {
                expected: nrows,
                actual: observation_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(CmirrError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }

        let observation_index = index_ids(&observation_ids, Axis::Observation)?;
        let sample_index = index_ids(&sample_ids, Axis::Sample)?;

        // Stored row-major regardless of input layout
        let data = if data.is_csr() { data } else { data.to_csr() };

        Ok(Self {
            data,
            observation_ids,
            sample_ids,
            observation_index,
            sample_index,
            observation_metadata: None,
            sample_metadata: None,
        })
    }

    /// Create from dense rows, one row per observation.
    pub fn from_dense(
        rows: &[Vec<u64>],
        observation_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let nrows = rows.len();
        let ncols = sample_ids.len();
        let mut tri_mat = TriMat::new((nrows, ncols));

        for (row, values) in rows.iter().enumerate() {
            if values.len() != ncols {
                return Err(CmirrError::DimensionMismatch {
                    expected: ncols,
                    actual: values.len(),
                });
            }
            for (col, &val) in values.iter().enumerate() {
                if val > 0 {
                    tri_mat.add_triplet(row, col, val);
                }
            }
        }

        Self::new(tri_mat.to_csr(), observation_ids, sample_ids)
    }

    /// Attach metadata along an axis, one record per ID in axis order.
    pub fn with_metadata(mut self, axis: Axis, records: Vec<MetadataRecord>) -> Result<Self> {
        let expected = self.ids(axis).len();
        if records.len() != expected {
            return Err(CmirrError::DimensionMismatch {
                expected,
                actual: records.len(),
            });
        }
        match axis {
            Axis::Observation => self.observation_metadata = Some(records),
            Axis::Sample => self.sample_metadata = Some(records),
        }
        Ok(self)
    }

    /// Drop all metadata along an axis.
    pub fn without_metadata(mut self, axis: Axis) -> Self {
        match axis {
            Axis::Observation => self.observation_metadata = None,
            Axis::Sample => self.sample_metadata = None,
        }
        self
    }

    /// Position of an ID along an axis.
    pub fn index(&self, id: &str, axis: Axis) -> Option<usize> {
        match axis {
            Axis::Observation => self.observation_index.get(id).copied(),
            Axis::Sample => self.sample_index.get(id).copied(),
        }
    }

    /// Get the underlying sparse matrix.
    #[inline]
    pub fn data(&self) -> &CsMat<u64> {
        &self.data
    }

    fn records(&self, axis: Axis) -> Option<&Vec<MetadataRecord>> {
        match axis {
            Axis::Observation => self.observation_metadata.as_ref(),
            Axis::Sample => self.sample_metadata.as_ref(),
        }
    }
}

impl ObservationTable for Table {
    fn ids(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Observation => &self.observation_ids,
            Axis::Sample => &self.sample_ids,
        }
    }

    fn axis_metadata(&self, axis: Axis) -> Option<&[MetadataRecord]> {
        self.records(axis).map(Vec::as_slice)
    }

    fn metadata(&self, id: &str, axis: Axis) -> Option<&MetadataRecord> {
        let idx = self.index(id, axis)?;
        self.records(axis)?.get(idx)
    }
}

fn index_ids(ids: &[String], axis: Axis) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(CmirrError::DuplicateId {
                axis: axis.to_string(),
                id: id.clone(),
            });
        }
    }
    Ok(index)
}

/// The small two-observation, three-sample table used throughout the docs and tests.
///
/// ```text
///       S1  S2  S3
/// O1     0   1   2    Bacteria; Firmicutes
/// O2     3   4   5    Bacteria; Bacteroidetes
/// ```
///
/// Samples carry an `environment` field (A, B, A).
pub fn example_table() -> Result<Table> {
    let observation_md = vec![
        taxonomy_record(["Bacteria", "Firmicutes"]),
        taxonomy_record(["Bacteria", "Bacteroidetes"]),
    ];
    let sample_md = ["A", "B", "A"]
        .iter()
        .map(|env| {
            MetadataRecord::from([(
                "environment".to_string(),
                MetadataValue::Text(env.to_string()),
            )])
        })
        .collect();

    Table::from_dense(
        &[vec![0, 1, 2], vec![3, 4, 5]],
        vec!["O1".to_string(), "O2".to_string()],
        vec!["S1".to_string(), "S2".to_string(), "S3".to_string()],
    )
    .and_then(|t| t.with_metadata(Axis::Observation, observation_md))
    .and_then(|t| t.with_metadata(Axis::Sample, sample_md))
}

fn taxonomy_record<const N: usize>(ranks: [&str; N]) -> MetadataRecord {
    MetadataRecord::from([("taxonomy".to_string(), MetadataValue::ranks(ranks))])
}
