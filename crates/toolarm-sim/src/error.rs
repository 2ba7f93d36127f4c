use thiserror::Error;

use toolarm_ik::SolverConfigError;
use toolarm_path::PathConfigError;

/// Session configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid solver config: {0}")]
    Solver(#[from] SolverConfigError),

    #[error("Invalid path config: {0}")]
    Path(#[from] PathConfigError),

    #[error("Invalid frame_dt: {0} (must be > 0)")]
    InvalidFrameDt(f32),
}
