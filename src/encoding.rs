//! Label/code tables for the categorical form fields.
//!
//! Each table is declared once and serves both directions: the labels populate
//! the selection widget, [`CategoryMap::encode`] turns a selection into the code
//! the model was trained on, and [`CategoryMap::decode`] redisplays a stored code.

use std::collections::HashMap;
use lazy_static::lazy_static;

use crate::error::ConfigError;

/// One categorical feature: display labels paired with model codes.
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryMap {
    /// Schema name of the feature
    pub field: &'static str,
    /// Widget caption
    pub caption: &'static str,
    /// `(label, code)` pairs in widget order
    pub entries: &'static [(&'static str, u8)],
    /// Label selected when the form first renders
    pub default_label: &'static str,
}

impl CategoryMap {
    /// Maps a display label to its model code.
    ///
    /// Labels come from the same table that fills the widget, so a miss means
    /// the table and the form have drifted apart. That is reported, never
    /// papered over with a default code.
    pub fn encode(&self, label: &str) -> Result<u8, ConfigError> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|&(_, code)| code)
            .ok_or_else(|| ConfigError::UnknownLabel {
                field: self.field.to_string(),
                label: label.to_string(),
            })
    }

    /// Maps a model code back to its display label.
    pub fn decode(&self, code: u8) -> Option<&'static str> {
        self.entries.iter().find(|&&(_, c)| c == code).map(|&(l, _)| l)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|&(l, _)| l)
    }

    pub fn default_code(&self) -> Result<u8, ConfigError> {
        self.encode(self.default_label)
    }

    /// Checks that labels are unique, codes are exactly `0..n` and the default
    /// label is one of the options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let malformed = |reason: String| ConfigError::MalformedCategoryMap {
            field: self.field.to_string(),
            reason,
        };

        if self.entries.is_empty() {
            return Err(malformed("no options".into()));
        }
        let mut seen_codes = vec![false; self.entries.len()];
        for (i, &(label, code)) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|&(l, _)| l == label) {
                return Err(malformed(format!("label '{}' appears twice", label)));
            }
            match seen_codes.get_mut(code as usize) {
                Some(seen) if !*seen => *seen = true,
                Some(_) => return Err(malformed(format!("code {} appears twice", code))),
                None => {
                    return Err(malformed(format!(
                        "code {} for '{}' is outside 0..{}",
                        code,
                        label,
                        self.entries.len()
                    )))
                }
            }
        }
        if self.position_of(self.default_label).is_none() {
            return Err(malformed(format!("default '{}' is not an option", self.default_label)));
        }
        Ok(())
    }

    fn position_of(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|&(l, _)| l == label)
    }
}

pub static CHECKING_STATUS: CategoryMap = CategoryMap {
    field: "checking_status",
    caption: "Checking Account Balance",
    entries: &[("No Checking", 0), ("<0 Birr", 1), ("0-2000 Birr", 2), (">2000 Birr", 3)],
    default_label: "No Checking",
};

pub static SAVINGS_STATUS: CategoryMap = CategoryMap {
    field: "savings_status",
    caption: "Savings Account Balance",
    entries: &[("<500 Birr", 0), ("500-5000 Birr", 1), ("5000-10000 Birr", 2), (">10000 Birr", 3)],
    default_label: "<500 Birr",
};

pub static EMPLOYMENT: CategoryMap = CategoryMap {
    field: "employment",
    caption: "Employment Duration",
    entries: &[
        ("Unemployed", 0),
        ("<1 year", 1),
        ("1-4 years", 2),
        ("4-7 years", 3),
        (">7 years", 4),
    ],
    default_label: "1-4 years",
};

pub static CREDIT_HISTORY: CategoryMap = CategoryMap {
    field: "credit_history",
    caption: "Credit History",
    entries: &[("Poor", 0), ("Fair", 1), ("Good", 2), ("Excellent", 3)],
    default_label: "Good",
};

pub static PERSONAL_STATUS: CategoryMap = CategoryMap {
    field: "personal_status",
    caption: "Personal Status",
    entries: &[
        ("Male Single", 0),
        ("Female Divorced/Separated/Married", 1),
        ("Male Divorced/Separated", 2),
        ("Male Married/Widowed", 3),
    ],
    default_label: "Male Single",
};

pub static OTHER_DEBTORS: CategoryMap = CategoryMap {
    field: "other_debtors",
    caption: "Other Debtors",
    entries: &[("None", 0), ("Co-Applicant", 1), ("Guarantor", 2)],
    default_label: "None",
};

pub static PROPERTY: CategoryMap = CategoryMap {
    field: "property",
    caption: "Property Owned",
    entries: &[("Real Estate", 0), ("Life Insurance", 1), ("Car", 2), ("No Property", 3)],
    default_label: "Real Estate",
};

pub static JOB: CategoryMap = CategoryMap {
    field: "job",
    caption: "Job Type",
    entries: &[("Unemployed", 0), ("Unskilled", 1), ("Skilled", 2), ("Highly Skilled", 3)],
    default_label: "Skilled",
};

/// All categorical fields, in form order.
pub static CATEGORY_MAPS: [&CategoryMap; 8] = [
    &CHECKING_STATUS,
    &SAVINGS_STATUS,
    &EMPLOYMENT,
    &CREDIT_HISTORY,
    &PERSONAL_STATUS,
    &OTHER_DEBTORS,
    &PROPERTY,
    &JOB,
];

lazy_static! {
    static ref BY_FIELD: HashMap<&'static str, &'static CategoryMap> =
        CATEGORY_MAPS.iter().map(|m| (m.field, *m)).collect();
}

/// Looks up the table for a schema field name.
pub fn category_map(field: &str) -> Option<&'static CategoryMap> {
    BY_FIELD.get(field).copied()
}

/// Validates every table. Run once at startup so a broken table fails loudly
/// before the first submission.
pub fn validate_all() -> Result<(), ConfigError> {
    CATEGORY_MAPS.iter().try_for_each(|m| m.validate())
}
