//! Dashboard configuration, read from `riskscope.toml`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::attribution::ExplainerConfig;
use crate::error::ConfigError;
use crate::runtime::RuntimeConfig;

/// Overrides both the artifact directory and the config file location.
pub const HOME_ENV: &str = "RISKSCOPE_HOME";
pub const CONFIG_FILE_NAME: &str = "riskscope.toml";

/// Where the model, background data and manifest live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// `None` resolves to [`default_artifact_dir`]
    pub dir: Option<PathBuf>,
    pub model_file: String,
    pub background_file: String,
    pub manifest_file: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: None,
            model_file: "credit_risk.onnx".to_string(),
            background_file: "background_data.csv".to_string(),
            manifest_file: "manifest.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub artifacts: ArtifactConfig,
    pub runtime: RuntimeConfig,
    pub explainer: ExplainerConfig,
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text).map_err(|reason| ConfigError::Invalid {
            what: "configuration".into(),
            path: path.to_path_buf(),
            reason,
        })?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Uses `explicit` if given, else `$RISKSCOPE_HOME/riskscope.toml` when it
    /// exists, else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(home) = env::var(HOME_ENV) {
            let path = PathBuf::from(home).join(CONFIG_FILE_NAME);
            if path.exists() {
                return Self::load(&path);
            }
        }
        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.artifacts.dir.clone().unwrap_or_else(default_artifact_dir)
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifact_dir().join(&self.artifacts.model_file)
    }

    pub fn background_path(&self) -> PathBuf {
        self.artifact_dir().join(&self.artifacts.background_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.artifact_dir().join(&self.artifacts.manifest_file)
    }
}

/// Returns the default artifact directory path
pub fn default_artifact_dir() -> PathBuf {
    artifact_dir_from(env::var(HOME_ENV).ok().map(PathBuf::from))
}

fn artifact_dir_from(home: Option<PathBuf>) -> PathBuf {
    // 1. Explicit home
    if let Some(home) = home {
        return home;
    }

    // 2. Platform-specific data directory
    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("riskscope");
    }

    // 3. User's home directory
    if let Some(home_dir) = dirs::home_dir() {
        return home_dir.join(".local").join("share").join("riskscope");
    }

    // 4. System temp directory
    env::temp_dir().join("riskscope")
}
