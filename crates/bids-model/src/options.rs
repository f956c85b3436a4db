//! Configuration threaded through the conversion pipeline.

use serde::{Deserialize, Serialize};

/// Options controlling missing-value policy, sheet requirements and
/// anonymization. Passed explicitly to every stage that needs it; there is
/// no process-wide configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Placeholder written to tabular cells for missing values.
    pub missing_value_text: String,

    /// Numeric code marking missing values in source tables. Internal
    /// bookkeeping only; it never reaches emitted output.
    pub missing_value_code: i64,

    /// Minimum number of sheets a task definition source must supply.
    pub min_required_sheets: usize,

    /// Replace item descriptions in task sidecars with a placeholder,
    /// keeping item names and levels.
    pub anonymize: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            missing_value_text: "n/a".to_string(),
            missing_value_code: -999,
            min_required_sheets: 3,
            anonymize: false,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_missing_value_text(mut self, text: impl Into<String>) -> Self {
        self.missing_value_text = text.into();
        self
    }

    #[must_use]
    pub fn with_missing_value_code(mut self, code: i64) -> Self {
        self.missing_value_code = code;
        self
    }

    #[must_use]
    pub fn with_anonymize(mut self, enable: bool) -> Self {
        self.anonymize = enable;
        self
    }
}
