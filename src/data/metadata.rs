//! Per-axis metadata carried by an observation table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One of the two axes of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Rows: features such as OTUs.
    Observation,
    /// Columns.
    Sample,
}

impl Axis {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Sample => "sample",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A metadata value attached to an observation or a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    /// Free text.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Ordered list of strings, e.g. taxonomic ranks from kingdom down.
    Ranks(Vec<String>),
    /// Missing value.
    Missing,
}

impl MetadataValue {
    /// Build a rank list from anything yielding string-like items.
    pub fn ranks<I, S>(ranks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ranks(ranks.into_iter().map(Into::into).collect())
    }

    /// Check if this is a missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, MetadataValue::Missing)
    }

    /// Try to get as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a rank list.
    pub fn as_ranks(&self) -> Option<&[String]> {
        match self {
            MetadataValue::Ranks(r) => Some(r),
            _ => None,
        }
    }
}

/// Metadata for a single ID: field name -> value.
pub type MetadataRecord = HashMap<String, MetadataValue>;
