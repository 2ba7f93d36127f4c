use std::path::Path;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use toolarm_ik::SolverConfig;
use toolarm_path::PathConfig;

use crate::error::ConfigError;

const fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Playback session configuration.
///
/// ```toml
/// frame_dt = 0.0166
///
/// [solver]
/// max_iterations = 20
/// tolerance = 0.01
/// damping_factor = 1.0
/// enabled = true
///
/// [path]
/// speed = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct SessionConfig {
    /// Solver settings. Required, with every field spelled out.
    pub solver: SolverConfig,

    /// Playback settings (default: [`PathConfig::default`]).
    #[serde(default)]
    pub path: PathConfig,

    /// Seconds per playback frame (default: 1/60).
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
}

impl SessionConfig {
    pub fn new(solver: SolverConfig) -> Self {
        Self {
            solver,
            path: PathConfig::default(),
            frame_dt: default_frame_dt(),
        }
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid solver, path or frame step value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()?;
        self.path.validate()?;
        if !self.frame_dt.is_finite() || self.frame_dt <= 0.0 {
            return Err(ConfigError::InvalidFrameDt(self.frame_dt));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed input, or the
    /// [`validate`](Self::validate) error.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
