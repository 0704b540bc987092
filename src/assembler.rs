use std::collections::HashMap;
use std::fmt;

use log::debug;
use ndarray::{Array1, Array2, ArrayView1};

use crate::encoding;
use crate::error::ConfigError;
use crate::form::{ApplicantForm, Purpose};
use crate::schema::{FeatureSchema, FEATURE_SCHEMA};

/// Feature name to numeric value for one submission. Built fresh per
/// submission and dropped once the row is assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicantInput {
    values: HashMap<&'static str, f32>,
}

impl ApplicantInput {
    /// Encodes every widget reading of `form` into model values.
    pub fn from_form(form: &ApplicantForm) -> Result<Self, ConfigError> {
        let mut input = Self::default();

        for (slider, value) in form.slider_values() {
            input.set(slider.field, value as f32);
        }
        for (field, label) in form.selections() {
            let map = encoding::category_map(field).ok_or_else(|| ConfigError::MalformedCategoryMap {
                field: field.to_string(),
                reason: "no category table registered".into(),
            })?;
            input.set(map.field, f32::from(map.encode(label)?));
        }
        input.set("telephone", flag(form.telephone));
        input.set("foreign_worker", flag(form.foreign_worker));
        for purpose in Purpose::ALL {
            input.set(purpose.field(), flag(form.has_purpose(purpose)));
        }

        Ok(input)
    }

    pub fn set(&mut self, field: &'static str, value: f32) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<f32> {
        self.values.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// A model-ready row whose slots follow [`FEATURE_SCHEMA`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Array1<f32>,
}

impl FeatureVector {
    /// Wraps a raw row without checking its width. Inference rejects rows
    /// whose width disagrees with the model.
    pub fn from_raw(values: Vec<f32>) -> Self {
        Self {
            schema: FEATURE_SCHEMA,
            values: Array1::from(values),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn values(&self) -> ArrayView1<'_, f32> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named slot.
    pub fn get(&self, field: &str) -> Option<f32> {
        self.schema.index_of(field).and_then(|i| self.values.get(i).copied())
    }

    /// The row as a `[1, n]` batch.
    pub fn to_batch(&self) -> Array2<f32> {
        self.values.clone().insert_axis(ndarray::Axis(0))
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            let name = self.schema.names.get(i).copied().unwrap_or("?");
            writeln!(f, "  {:<18} {}", name, value)?;
        }
        Ok(())
    }
}

/// Lays `input` out in schema order.
///
/// Order comes from walking the schema constant, never from the map. A slot
/// the input does not cover is a configuration error.
pub fn assemble(input: &ApplicantInput) -> Result<FeatureVector, ConfigError> {
    let values = FEATURE_SCHEMA
        .iter()
        .map(|name| {
            input.get(name).ok_or_else(|| {
                ConfigError::SchemaMismatch(format!(
                    "no value for '{}' required by schema {}",
                    name, FEATURE_SCHEMA.version
                ))
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if input.len() != FEATURE_SCHEMA.len() {
        return Err(ConfigError::SchemaMismatch(format!(
            "input carries {} fields, schema {} has {}",
            input.len(),
            FEATURE_SCHEMA.version,
            FEATURE_SCHEMA.len()
        )));
    }

    debug!("Assembled {} features for schema {}", values.len(), FEATURE_SCHEMA.version);
    Ok(FeatureVector {
        schema: FEATURE_SCHEMA,
        values: Array1::from(values),
    })
}

/// Encodes and assembles a form in one step.
pub fn assemble_form(form: &ApplicantForm) -> Result<FeatureVector, ConfigError> {
    assemble(&ApplicantInput::from_form(form)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_COUNT;

    #[test]
    fn test_default_form_scenario() {
        let form = ApplicantForm {
            duration: 12,
            credit_amount: 10_000,
            age: 30,
            checking_status: "No Checking".into(),
            ..Default::default()
        };
        let row = assemble_form(&form).unwrap();

        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(row.get("checking_status"), Some(0.0));
        assert_eq!(row.get("duration"), Some(12.0));
        assert_eq!(row.get("credit_amount"), Some(10_000.0));
        assert_eq!(row.get("age"), Some(30.0));
        for purpose in Purpose::ALL {
            assert_eq!(row.get(purpose.field()), Some(0.0), "{}", purpose.field());
        }
        assert_eq!(row.get("employment"), Some(2.0));
        assert_eq!(row.get("job"), Some(2.0));
    }

    #[test]
    fn test_slots_follow_schema_positions() {
        let form = ApplicantForm {
            duration: 7,
            num_dependents: 2,
            telephone: true,
            purposes: vec![Purpose::Vacation, Purpose::Car],
            ..Default::default()
        };
        let row = assemble_form(&form).unwrap();
        let values = row.values();

        assert_eq!(values[0], 7.0);
        assert_eq!(values[6], 2.0);
        assert_eq!(values[FEATURE_SCHEMA.index_of("telephone").unwrap()], 1.0);
        assert_eq!(values[FEATURE_SCHEMA.index_of("foreign_worker").unwrap()], 0.0);
        assert_eq!(values[17], 1.0);
        assert_eq!(values[FEATURE_COUNT - 1], 1.0);
        assert_eq!(values.iter().skip(18).take(5).sum::<f32>(), 0.0);
    }

    #[test]
    fn test_unknown_label_is_config_error() {
        let form = ApplicantForm {
            property: "Yacht".into(),
            ..Default::default()
        };
        let err = assemble_form(&form).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLabel { ref field, .. } if field == "property"));
    }

    #[test]
    fn test_missing_slot_is_schema_mismatch() {
        let mut input = ApplicantInput::from_form(&ApplicantForm::default()).unwrap();
        input.values.remove("residence_since");
        let err = assemble(&input).unwrap_err();
        assert!(err.to_string().contains("residence_since"));
    }

    #[test]
    fn test_extra_field_is_schema_mismatch() {
        let mut input = ApplicantInput::from_form(&ApplicantForm::default()).unwrap();
        input.set("salary", 1.0);
        assert!(matches!(assemble(&input), Err(ConfigError::SchemaMismatch(_))));
    }

    #[test]
    fn test_batch_shape() {
        let row = assemble_form(&ApplicantForm::default()).unwrap();
        assert_eq!(row.to_batch().shape(), &[1, FEATURE_COUNT]);
    }
}
