//! External joint-limit override documents.
//!
//! Controllers often ship a stricter limit table next to the URDF. The
//! document is JSON with parallel `names` / `elements` arrays:
//!
//! ```json
//! { "limits": { "names": ["a1"], "elements": [
//!     { "min": { "position": -1.0 }, "max": { "position": 1.0, "velocity": 2.0 } }
//! ] } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LimitsError;

/// One side of an external limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitBound {
    pub position: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,
}

impl LimitBound {
    pub const fn position(position: f32) -> Self {
        Self {
            position,
            effort: None,
            velocity: None,
        }
    }
}

/// Stricter limit supplied for a single joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalLimit {
    pub min: LimitBound,
    pub max: LimitBound,
}

impl ExternalLimit {
    /// Position-only override.
    pub const fn position(min: f32, max: f32) -> Self {
        Self {
            min: LimitBound::position(min),
            max: LimitBound::position(max),
        }
    }
}

/// External limits keyed by joint name.
pub type ExternalLimits = HashMap<String, ExternalLimit>;

#[derive(Deserialize)]
struct LimitsDocument {
    limits: LimitsTable,
}

#[derive(Deserialize)]
struct LimitsTable {
    names: Vec<String>,
    elements: Vec<ExternalLimit>,
}

/// Parse a limit document from a JSON string.
pub fn parse_limits_str(json: &str) -> Result<ExternalLimits, LimitsError> {
    let doc: LimitsDocument = serde_json::from_str(json)?;
    let LimitsTable { names, elements } = doc.limits;
    if names.len() != elements.len() {
        return Err(LimitsError::CountMismatch {
            names: names.len(),
            elements: elements.len(),
        });
    }

    let mut out = HashMap::with_capacity(names.len());
    for (name, limit) in names.into_iter().zip(elements) {
        if limit.min.position > limit.max.position {
            return Err(LimitsError::InvertedRange { joint: name });
        }
        if out.contains_key(&name) {
            return Err(LimitsError::DuplicateJoint(name));
        }
        out.insert(name, limit);
    }
    tracing::debug!(joints = out.len(), "loaded external joint limits");
    Ok(out)
}

/// Read and parse a limit document from disk.
pub fn load_limits_file(path: impl AsRef<Path>) -> Result<ExternalLimits, LimitsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| LimitsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_limits_str(&content)
}
