//! The input form: slider bounds, select defaults and checkbox flags.
//!
//! Range checks live here, with the widgets, and nowhere else. The assembler
//! trusts whatever the form hands it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::encoding::{
    CHECKING_STATUS, CREDIT_HISTORY, EMPLOYMENT, JOB, OTHER_DEBTORS, PERSONAL_STATUS, PROPERTY,
    SAVINGS_STATUS,
};
use crate::error::FormError;

/// A bounded integer widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slider {
    pub field: &'static str,
    pub caption: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl Slider {
    pub fn check(&self, value: u32) -> Result<u32, FormError> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(FormError::OutOfRange {
                field: self.field,
                min: self.min,
                max: self.max,
                value,
            })
        }
    }
}

pub const DURATION: Slider = Slider { field: "duration", caption: "Loan Duration (months)", min: 0, max: 60, default: 12 };
pub const CREDIT_AMOUNT: Slider = Slider { field: "credit_amount", caption: "Loan Amount (Birr)", min: 0, max: 100_000, default: 10_000 };
pub const AGE: Slider = Slider { field: "age", caption: "Age (years)", min: 18, max: 100, default: 30 };
pub const INSTALLMENT_RATE: Slider = Slider { field: "installment_rate", caption: "Installment Rate (% of income)", min: 1, max: 4, default: 2 };
pub const RESIDENCE_SINCE: Slider = Slider { field: "residence_since", caption: "Years at Current Residence", min: 0, max: 4, default: 2 };
pub const NUM_CREDITS: Slider = Slider { field: "num_credits", caption: "Number of Existing Credits", min: 1, max: 4, default: 1 };
pub const NUM_DEPENDENTS: Slider = Slider { field: "num_dependents", caption: "Number of Dependents", min: 0, max: 2, default: 1 };

pub const SLIDERS: [Slider; 7] = [
    DURATION,
    CREDIT_AMOUNT,
    AGE,
    INSTALLMENT_RATE,
    RESIDENCE_SINCE,
    NUM_CREDITS,
    NUM_DEPENDENTS,
];

/// Loan purpose checkboxes. Each maps to its own one-hot schema slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Purpose {
    Car,
    Furniture,
    RadioTv,
    Domestic,
    Repairs,
    Education,
    Vacation,
}

impl Purpose {
    pub const ALL: [Purpose; 7] = [
        Purpose::Car,
        Purpose::Furniture,
        Purpose::RadioTv,
        Purpose::Domestic,
        Purpose::Repairs,
        Purpose::Education,
        Purpose::Vacation,
    ];

    pub fn field(self) -> &'static str {
        match self {
            Purpose::Car => "purpose_car",
            Purpose::Furniture => "purpose_furniture",
            Purpose::RadioTv => "purpose_radio_tv",
            Purpose::Domestic => "purpose_domestic",
            Purpose::Repairs => "purpose_repairs",
            Purpose::Education => "purpose_education",
            Purpose::Vacation => "purpose_vacation",
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Purpose::Car => "Loan for Car",
            Purpose::Furniture => "Loan for Furniture",
            Purpose::RadioTv => "Loan for Radio/TV",
            Purpose::Domestic => "Loan for Domestic Appliances",
            Purpose::Repairs => "Loan for Repairs",
            Purpose::Education => "Loan for Education",
            Purpose::Vacation => "Loan for Vacation",
        }
    }
}

/// One submission of the form, as the applicant sees it: slider values,
/// selected display labels and checkbox states.
///
/// `Default` is the form as first rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantForm {
    pub duration: u32,
    pub credit_amount: u32,
    pub age: u32,
    pub installment_rate: u32,
    pub residence_since: u32,
    pub num_credits: u32,
    pub num_dependents: u32,

    pub checking_status: String,
    pub savings_status: String,
    pub employment: String,
    pub credit_history: String,
    pub personal_status: String,
    pub other_debtors: String,
    pub property: String,
    pub job: String,

    pub telephone: bool,
    pub foreign_worker: bool,
    pub purposes: Vec<Purpose>,
}

impl Default for ApplicantForm {
    fn default() -> Self {
        Self {
            duration: DURATION.default,
            credit_amount: CREDIT_AMOUNT.default,
            age: AGE.default,
            installment_rate: INSTALLMENT_RATE.default,
            residence_since: RESIDENCE_SINCE.default,
            num_credits: NUM_CREDITS.default,
            num_dependents: NUM_DEPENDENTS.default,
            checking_status: CHECKING_STATUS.default_label.to_string(),
            savings_status: SAVINGS_STATUS.default_label.to_string(),
            employment: EMPLOYMENT.default_label.to_string(),
            credit_history: CREDIT_HISTORY.default_label.to_string(),
            personal_status: PERSONAL_STATUS.default_label.to_string(),
            other_debtors: OTHER_DEBTORS.default_label.to_string(),
            property: PROPERTY.default_label.to_string(),
            job: JOB.default_label.to_string(),
            telephone: false,
            foreign_worker: false,
            purposes: Vec::new(),
        }
    }
}

impl ApplicantForm {
    /// Slider readings paired with their widgets, in form order.
    pub fn slider_values(&self) -> [(Slider, u32); 7] {
        [
            (DURATION, self.duration),
            (CREDIT_AMOUNT, self.credit_amount),
            (AGE, self.age),
            (INSTALLMENT_RATE, self.installment_rate),
            (RESIDENCE_SINCE, self.residence_since),
            (NUM_CREDITS, self.num_credits),
            (NUM_DEPENDENTS, self.num_dependents),
        ]
    }

    /// Selected labels keyed by schema field, in form order.
    pub fn selections(&self) -> [(&'static str, &str); 8] {
        [
            (CHECKING_STATUS.field, self.checking_status.as_str()),
            (SAVINGS_STATUS.field, self.savings_status.as_str()),
            (EMPLOYMENT.field, self.employment.as_str()),
            (CREDIT_HISTORY.field, self.credit_history.as_str()),
            (PERSONAL_STATUS.field, self.personal_status.as_str()),
            (OTHER_DEBTORS.field, self.other_debtors.as_str()),
            (PROPERTY.field, self.property.as_str()),
            (JOB.field, self.job.as_str()),
        ]
    }

    pub fn has_purpose(&self, purpose: Purpose) -> bool {
        self.purposes.contains(&purpose)
    }

    /// Applies the slider bounds. The CLI enforces these while parsing, so
    /// this only matters for callers that build a form by hand.
    pub fn check_bounds(&self) -> Result<(), FormError> {
        for (slider, value) in self.slider_values() {
            slider.check(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_SCHEMA;

    #[test]
    fn test_default_form_is_in_bounds() {
        assert!(ApplicantForm::default().check_bounds().is_ok());
        for slider in SLIDERS {
            assert!(slider.check(slider.default).is_ok(), "{}", slider.field);
        }
    }

    #[test]
    fn test_slider_bounds() {
        assert_eq!(AGE.check(18), Ok(18));
        assert_eq!(AGE.check(100), Ok(100));
        assert_eq!(
            AGE.check(17),
            Err(FormError::OutOfRange { field: "age", min: 18, max: 100, value: 17 })
        );

        let form = ApplicantForm { duration: 61, ..Default::default() };
        assert!(matches!(form.check_bounds(), Err(FormError::OutOfRange { field: "duration", .. })));
    }

    #[test]
    fn test_every_widget_is_a_schema_field() {
        for slider in SLIDERS {
            assert!(FEATURE_SCHEMA.index_of(slider.field).is_some(), "{}", slider.field);
        }
        for purpose in Purpose::ALL {
            assert!(FEATURE_SCHEMA.index_of(purpose.field()).is_some(), "{}", purpose.field());
        }
    }

    #[test]
    fn test_partial_form_deserializes_with_defaults() {
        let form: ApplicantForm = serde_json::from_str(
            r#"{ "age": 45, "purposes": ["radio_tv"], "job": "Highly Skilled" }"#,
        )
        .unwrap();
        assert_eq!(form.age, 45);
        assert_eq!(form.duration, 12);
        assert_eq!(form.job, "Highly Skilled");
        assert!(form.has_purpose(Purpose::RadioTv));
        assert!(!form.has_purpose(Purpose::Car));
    }
}
