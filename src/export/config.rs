//! Export configuration.

use crate::error::{CmirrError, Result};
use serde::{Deserialize, Serialize};

/// How much of the table is checked for taxonomy before the first line is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Probe only the first observation's metadata.
    ///
    /// Later observations without taxonomy fail when they are reached.
    #[default]
    FirstObservation,
    /// Require every observation to carry a rank list before yielding anything.
    AllObservations,
}

/// Settings for taxonomy export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Observation metadata field holding the rank list.
    pub field: String,
    /// Joiner placed between ranks.
    pub separator: String,
    /// Upfront validation policy.
    pub validation: ValidationPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            field: "taxonomy".to_string(),
            separator: "; ".to_string(),
            validation: ValidationPolicy::default(),
        }
    }
}

impl ExportConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metadata field name.
    pub fn field(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }

    /// Set the rank separator.
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    /// Set the validation policy.
    pub fn validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(CmirrError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(CmirrError::from)
    }
}
