//! Credit-risk assessment with per-feature explanations.
//!
//! An applicant form is encoded into a fixed, schema-ordered feature vector,
//! scored by a pre-trained classifier and explained with KernelSHAP. Each
//! submission yields a prediction, a waterfall chart of contributions and a
//! plain-language narrative.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use ndarray::Array2;
//! use riskscope::{
//!     ApplicantForm, BackgroundData, Dashboard, ExplainerConfig, LogisticModel, NarrativeOrder,
//!     RiskModel, FEATURE_COUNT,
//! };
//!
//! let mut coefficients = vec![0.0; FEATURE_COUNT];
//! coefficients[0] = -0.03; // duration
//! let model: Arc<dyn RiskModel> = Arc::new(LogisticModel::new(0.8, coefficients));
//! let background = BackgroundData::from_rows(Array2::from_elem((4, FEATURE_COUNT), 1.0))?;
//! let dashboard = Dashboard::from_parts(model, background, ExplainerConfig::default())?;
//!
//! let form = ApplicantForm { duration: 24, ..Default::default() };
//! let report = dashboard.submit(&form, NarrativeOrder::Schema)?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A [`Dashboard`] is read-only once loaded. Clone it or wrap it in `Arc` to
//! serve submissions from several threads.

pub mod artifacts;
pub mod assembler;
pub mod attribution;
pub mod background;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod encoding;
pub mod error;
pub mod form;
pub mod inference;
pub mod model;
pub mod narrative;
pub mod runtime;
pub mod schema;

pub use artifacts::{ArtifactStore, Manifest, Verification};
pub use assembler::{assemble, assemble_form, ApplicantInput, FeatureVector};
pub use attribution::{Contribution, ContributionVector, ExplainerConfig, KernelExplainer};
pub use background::BackgroundData;
pub use chart::{waterfall_chart, WaterfallChart};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Report};
pub use encoding::{category_map, CategoryMap, CATEGORY_MAPS};
pub use error::{AssessError, ConfigError, FormError, InferenceError};
pub use form::{ApplicantForm, Purpose, Slider, SLIDERS};
pub use inference::{Assessment, InferenceAdapter, InferenceResult, RiskLabel};
pub use model::{load_model, LogisticModel, OnnxModel, RiskModel};
pub use narrative::{generate_narrative, Narrative, NarrativeOrder};
pub use runtime::{OptimizationLevel, RuntimeConfig};
pub use schema::{FeatureSchema, FEATURE_COUNT, FEATURE_SCHEMA, SCHEMA_VERSION};

pub fn init_logger() {
    env_logger::init();
}
