use std::io;
use std::path::PathBuf;

/// Errors that make the assessment tool unusable until its configuration or
/// artifacts are fixed. These are raised at startup or on first use and are
/// never recoverable by the applicant.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A display label was submitted that its category table does not contain
    #[error("Unknown label '{label}' for categorical field '{field}'")]
    UnknownLabel { field: String, label: String },
    /// A category table violates the label/code bijection
    #[error("Malformed category table '{field}': {reason}")]
    MalformedCategoryMap { field: String, reason: String },
    /// The assembled row, the background data or the model disagree with the feature schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// A configuration or artifact file could not be parsed
    #[error("Invalid {what} at {path:?}: {reason}")]
    Invalid { what: String, path: PathBuf, reason: String },
    /// An artifact is missing from the artifact directory
    #[error("Artifact not found: {0:?}")]
    MissingArtifact(PathBuf),
    #[error("Checksum mismatch for {file_type} file: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Model error: {0}")]
    Model(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ort::Error> for ConfigError {
    fn from(err: ort::Error) -> Self {
        ConfigError::Model(err.to_string())
    }
}

/// Failures raised while running the classifier or the attribution engine on
/// one submission. The caller reports these as a failed assessment.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The feature vector does not have the width the model was trained on
    #[error("Input has {actual} features, model expects {expected}")]
    InputShape { expected: usize, actual: usize },
    /// The model runtime rejected the input or failed while running
    #[error("Model execution failed: {0}")]
    Model(String),
    /// The model produced output that cannot be interpreted
    #[error("Unexpected model output: {0}")]
    Output(String),
    /// The attribution engine could not produce contributions
    #[error("Attribution failed: {0}")]
    Attribution(String),
}

impl From<ort::Error> for InferenceError {
    fn from(err: ort::Error) -> Self {
        InferenceError::Model(err.to_string())
    }
}

/// Raised when a library caller hands the form a value outside a widget's bounds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
}

/// Everything that can go wrong for a single form submission.
#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Risk assessment failed: {0}")]
    Inference(#[from] InferenceError),
}
