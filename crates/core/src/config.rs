//! Static walkthrough configuration.
//!
//! A configuration is a JSON document loaded once at startup. It is
//! validated as a whole before any state is built, so navigation never has
//! to cope with unsorted timelines or dangling example ids.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use layerwalk_protocol::{CameraPose, Mat4};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::camera::CameraState;
use crate::model::walkthrough::{TimelineError, validate_times};
use crate::model::{Example, ExampleId, ExampleSelection, LayoutDocument, TimeInterval, Walkthrough};
use crate::state::ProgramState;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timeline: {0}")]
    Timeline(#[from] TimelineError),
    #[error("example id {0} is reserved for the main example")]
    ReservedExampleId(ExampleId),
    #[error("initial example {0} does not exist")]
    UnknownInitialExample(ExampleId),
    #[error("{0} contains non-finite values")]
    NonFinite(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Length of the walkthrough clock.
    pub phase_length: f64,
    #[serde(default)]
    pub times: Vec<TimeInterval>,
    pub main_example: Example,
    #[serde(default)]
    pub examples: BTreeMap<ExampleId, Example>,
    #[serde(default)]
    pub initial_example: ExampleId,
    /// Initial layout of the main model.
    pub layout: LayoutDocument,
    /// Column-major model-to-world transform; identity when omitted.
    #[serde(default)]
    pub model_transform: Mat4,
}

impl ProgramConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_slice(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_slice(&data)?;
        info!(
            path = %path.display(),
            intervals = config.times.len(),
            examples = config.examples.len(),
            "loaded walkthrough configuration"
        );
        Ok(config)
    }

    /// Reject anything the navigation and camera code assume cannot happen.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.phase_length.is_finite() || self.phase_length < 0.0 {
            return Err(TimelineError::InvalidPhaseLength(self.phase_length).into());
        }
        validate_times(&self.times)?;

        check_example("main_example", &self.main_example)?;
        for (id, example) in &self.examples {
            if id.0 < 0 {
                return Err(ConfigError::ReservedExampleId(*id));
            }
            check_example(&format!("example {id}"), example)?;
        }
        if !self.initial_example.is_main() && !self.examples.contains_key(&self.initial_example) {
            return Err(ConfigError::UnknownInitialExample(self.initial_example));
        }

        if !self.layout.is_finite() {
            return Err(ConfigError::NonFinite("layout".into()));
        }
        if !self.model_transform.is_finite() {
            return Err(ConfigError::NonFinite("model_transform".into()));
        }
        Ok(())
    }

    /// Build the program state. The configuration is validated again, so
    /// a hand-built config gets the same checks as a loaded one.
    pub fn into_state(self) -> Result<ProgramState, ConfigError> {
        self.validate()?;
        let walkthrough = Walkthrough::new(self.times, self.phase_length)?;
        let mut examples =
            ExampleSelection::from_parts(self.main_example, self.examples, ExampleId::MAIN);
        examples.select(self.initial_example);
        Ok(ProgramState::new(
            self.layout,
            walkthrough,
            examples,
            CameraState::new(self.model_transform),
        ))
    }
}

fn check_example(what: &str, example: &Example) -> Result<(), ConfigError> {
    let CameraPose { center, angle } = example.camera;
    let layout_ok = example.layout.as_ref().is_none_or(LayoutDocument::is_finite);
    if center.is_finite() && angle.is_finite() && example.offset.is_finite() && layout_ok {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(what.to_string()))
    }
}

impl ProgramState {
    /// Load and validate a configuration file, then build the state.
    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ProgramConfig::from_path(path)?.into_state()
    }
}
