use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::ConfigError;

/// Outcome of the one ONNX Runtime initialisation attempt.
static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// ONNX Runtime graph optimisation level, as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Disable,
    Level1,
    Level2,
    Level3,
}

impl From<OptimizationLevel> for GraphOptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
            OptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        }
    }
}

/// Session settings for ONNX classifiers.
///
/// Attribution runs the model on thousands of synthetic rows per submission,
/// so intra-op threading is where tuning pays off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: OptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 0, // Let ONNX Runtime decide
            optimization_level: OptimizationLevel::Level3,
        }
    }
}

fn init_onnx_environment() -> OrtResult<()> {
    ort::init().with_name("riskscope").commit()?;
    Ok(())
}

/// Initialises ONNX Runtime once. A failed first attempt is remembered and
/// returned on every later call.
pub fn ensure_initialized() -> Result<(), ConfigError> {
    init_once(&INIT, || init_onnx_environment().map_err(|e| e.to_string()))
}

fn init_once(
    cell: &OnceLock<Result<(), String>>,
    init: impl FnOnce() -> Result<(), String>,
) -> Result<(), ConfigError> {
    cell.get_or_init(|| {
        let result = init();
        if let Err(e) = &result {
            log::error!("Failed to initialize ONNX Runtime environment: {}", e);
        }
        result
    })
    .clone()
    .map_err(ConfigError::Model)
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, ConfigError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }
    builder = builder.with_optimization_level(config.optimization_level.into())?;

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_initialization() {
        assert!(ensure_initialized().is_ok());
        assert!(ensure_initialized().is_ok()); // Second call should be fine
    }

    #[test]
    fn test_failed_initialization_is_remembered() {
        let cell = OnceLock::new();
        let mut attempts = 0;
        let first = init_once(&cell, || {
            attempts += 1;
            Err("no runtime library".to_string())
        });
        assert!(matches!(first, Err(ConfigError::Model(ref m)) if m == "no runtime library"));

        let second = init_once(&cell, || Ok(()));
        assert!(matches!(second, Err(ConfigError::Model(_))));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_session_builder_config() {
        let config = RuntimeConfig {
            inter_threads: 2,
            intra_threads: 2,
            optimization_level: OptimizationLevel::Level1,
        };
        assert!(create_session_builder(&config).is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config: RuntimeConfig = toml::from_str("intra_threads = 4\noptimization_level = \"level2\"").unwrap();
        assert_eq!(config.intra_threads, 4);
        assert_eq!(config.inter_threads, 0);
        assert_eq!(config.optimization_level, OptimizationLevel::Level2);
    }
}
