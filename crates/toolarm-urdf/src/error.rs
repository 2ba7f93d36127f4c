//! Error types for robot description parsing and limit documents.

use std::path::PathBuf;

/// Errors that can occur while reading or validating a robot description.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the URDF file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The document has no `<robot>` element.
    #[error("no <robot> element found")]
    MissingRootElement,

    /// A required attribute is absent.
    #[error("<{element}> is missing attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A joint lacks a required child element.
    #[error("joint {joint} is missing <{element}>")]
    MissingElement {
        joint: String,
        element: &'static str,
    },

    /// A numeric attribute could not be parsed.
    #[error("invalid number in {attribute}: {value:?}")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },

    /// Joint type outside revolute / continuous / prismatic / fixed.
    #[error("unsupported joint type: {0}")]
    UnsupportedJointType(String),

    /// Two links share a name.
    #[error("duplicate link: {0}")]
    DuplicateLink(String),

    /// Two joints share a name.
    #[error("duplicate joint: {0}")]
    DuplicateJoint(String),

    /// A joint references a link that does not exist.
    #[error("joint {joint} references missing link {link}")]
    DanglingJointReference { joint: String, link: String },

    /// A link is the child of more than one joint.
    #[error("link {link} has more than one parent joint")]
    MultipleParents { link: String },

    /// Zero or several links are never a joint's child.
    #[error("ambiguous root link: candidates {candidates:?}")]
    AmbiguousRoot { candidates: Vec<String> },

    /// A link cannot be reached from the root (cycle or detached subtree).
    #[error("link {0} is not reachable from the root link")]
    UnreachableLink(String),

    /// Lookup of a link that is not in the description.
    #[error("missing link: {0}")]
    MissingLink(String),

    /// Lookup of a joint that is not in the description.
    #[error("missing joint: {0}")]
    MissingJoint(String),
}

/// Errors raised while loading an external joint-limit document.
#[derive(Debug, thiserror::Error)]
pub enum LimitsError {
    /// Failed to read the limits file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not valid JSON of the expected shape.
    #[error("limits JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `names` and `elements` have different lengths.
    #[error("joint limits mismatch: {names} names but {elements} elements")]
    CountMismatch { names: usize, elements: usize },

    /// An entry's own minimum exceeds its maximum.
    #[error("limit for joint {joint} has min > max")]
    InvertedRange { joint: String },

    /// A joint name appears more than once in `names`.
    #[error("duplicate limit entry for joint {0}")]
    DuplicateJoint(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
