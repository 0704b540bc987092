//! The process-wide assessment pipeline.
//!
//! A [`Dashboard`] owns the classifier, the background data and the
//! attribution engine. It is built once at startup and each call to
//! [`Dashboard::submit`] runs one form submission through
//! encode -> assemble -> infer -> narrate + chart.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::artifacts::{ArtifactStore, Verification};
use crate::assembler::{assemble_form, FeatureVector};
use crate::attribution::{ContributionVector, ExplainerConfig, KernelExplainer};
use crate::background::BackgroundData;
use crate::chart::{waterfall_chart, WaterfallChart};
use crate::config::DashboardConfig;
use crate::encoding;
use crate::error::{AssessError, ConfigError};
use crate::form::ApplicantForm;
use crate::inference::{InferenceAdapter, InferenceResult};
use crate::model::{load_model, RiskModel};
use crate::narrative::{generate_narrative, Narrative, NarrativeOrder};
use crate::schema::FEATURE_SCHEMA;

/// Width of the terminal waterfall in [`Report`]'s `Display` output.
const CHART_WIDTH: usize = 48;

#[derive(Debug, Clone)]
pub struct Dashboard {
    adapter: InferenceAdapter,
}

impl Dashboard {
    /// Verifies and loads every artifact named by `config`.
    pub fn load(config: &DashboardConfig) -> Result<Self, ConfigError> {
        encoding::validate_all()?;

        let store = ArtifactStore::new(config);
        if store.verify()? == Verification::Unchecked {
            debug!("Continuing with unverified artifacts");
        }

        let model: Arc<dyn RiskModel> = Arc::from(load_model(store.model_path(), &config.runtime)?);
        let background = BackgroundData::load(store.background_path())?;
        let dashboard = Self::from_parts(model, background, config.explainer.clone())?;
        info!("Dashboard ready with model {}", dashboard.model().describe());
        Ok(dashboard)
    }

    /// Builds a dashboard from artifacts already in memory.
    pub fn from_parts(
        model: Arc<dyn RiskModel>,
        background: BackgroundData,
        explainer: ExplainerConfig,
    ) -> Result<Self, ConfigError> {
        FEATURE_SCHEMA.check_width(model.input_width(), "model input")?;
        let explainer = KernelExplainer::new(Arc::clone(&model), background, explainer)?;
        Ok(Self {
            adapter: InferenceAdapter::new(model, Arc::new(explainer)),
        })
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.adapter.model()
    }

    pub fn adapter(&self) -> &InferenceAdapter {
        &self.adapter
    }

    /// Runs one submission through the whole pipeline.
    pub fn submit(&self, form: &ApplicantForm, order: NarrativeOrder) -> Result<Report, AssessError> {
        form.check_bounds()?;
        let input = assemble_form(form)?;
        debug!("Assembled input row:\n{}", input);

        let assessment = self.adapter.assess(&input)?;
        let narrative = generate_narrative(&assessment.contributions, order);
        let chart = waterfall_chart(&assessment.contributions);
        info!(
            "Assessed applicant: {} ({:.2}%)",
            assessment.result.label,
            assessment.result.probability * 100.0
        );

        Ok(Report {
            input,
            result: assessment.result,
            contributions: assessment.contributions,
            narrative,
            chart,
        })
    }
}

/// Everything shown for one successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub input: FeatureVector,
    pub result: InferenceResult,
    pub contributions: ContributionVector,
    pub narrative: Narrative,
    pub chart: WaterfallChart,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input Data:")?;
        write!(f, "{}", self.input)?;
        writeln!(f)?;
        writeln!(
            f,
            "Prediction: {} Probability: {}",
            self.result.class, self.result.probability
        )?;
        writeln!(f)?;
        writeln!(f, "Risk Outcome")?;
        writeln!(
            f,
            "  Risk Level: {} ({:.2}%)",
            self.result.label,
            self.result.probability * 100.0
        )?;
        writeln!(f)?;
        write!(f, "{}", self.chart.render_text(CHART_WIDTH))?;
        writeln!(f)?;
        write!(f, "{}", self.narrative)
    }
}
