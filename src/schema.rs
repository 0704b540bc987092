//! The feature layout the trained model was fitted on.
//!
//! The classifier is order-sensitive and cannot validate or reorder its input,
//! so every component that produces or consumes a feature row goes through
//! [`FEATURE_SCHEMA`]. Retraining the model with a different column order means
//! bumping [`SCHEMA_VERSION`] and editing this list, nothing else.

use crate::error::ConfigError;

/// Version tag shared with the model manifest.
pub const SCHEMA_VERSION: &str = "german-credit-v1";

/// Number of slots in a feature row.
pub const FEATURE_COUNT: usize = 24;

/// An ordered, versioned list of feature slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub version: &'static str,
    pub names: &'static [&'static str; FEATURE_COUNT],
}

pub const FEATURE_SCHEMA: FeatureSchema = FeatureSchema {
    version: SCHEMA_VERSION,
    names: &[
        "duration",
        "credit_amount",
        "age",
        "installment_rate",
        "residence_since",
        "num_credits",
        "num_dependents",
        "checking_status",
        "savings_status",
        "employment",
        "credit_history",
        "personal_status",
        "other_debtors",
        "property",
        "job",
        "telephone",
        "foreign_worker",
        "purpose_car",
        "purpose_furniture",
        "purpose_radio_tv",
        "purpose_domestic",
        "purpose_repairs",
        "purpose_education",
        "purpose_vacation",
    ],
};

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a feature in the row, if the schema has it.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    /// Checks that an externally supplied column list (a CSV header, a model
    /// signature) names exactly these slots in exactly this order.
    pub fn check_columns<S: AsRef<str>>(&self, columns: &[S], source: &str) -> Result<(), ConfigError> {
        if columns.len() != self.len() {
            return Err(ConfigError::SchemaMismatch(format!(
                "{} has {} columns, schema {} has {}",
                source,
                columns.len(),
                self.version,
                self.len()
            )));
        }
        for (pos, (got, expected)) in columns.iter().zip(self.iter()).enumerate() {
            if got.as_ref().trim() != expected {
                return Err(ConfigError::SchemaMismatch(format!(
                    "{} column {} is '{}', schema {} expects '{}'",
                    source,
                    pos,
                    got.as_ref().trim(),
                    self.version,
                    expected
                )));
            }
        }
        Ok(())
    }

    /// Checks a model's declared input width. `None` means the model did not
    /// declare a static width and the check is deferred to the first run.
    pub fn check_width(&self, width: Option<usize>, source: &str) -> Result<(), ConfigError> {
        match width {
            Some(w) if w != self.len() => Err(ConfigError::SchemaMismatch(format!(
                "{} expects {} features, schema {} has {}",
                source,
                w,
                self.version,
                self.len()
            ))),
            _ => Ok(()),
        }
    }
}
