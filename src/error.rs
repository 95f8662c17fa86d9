use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating version documents or re-signing bundles.
///
/// A dependency whose `versions.xml` cannot be found is not an error; see
/// [`crate::resolver::SideArtifact::NotFound`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Sync info file '{}' not found. Please configure your SCM plugin accordingly.",
        .0.display()
    )]
    MissingProvenanceFile(PathBuf),

    #[error("Cannot parse sync info file '{}': {reason}", path.display())]
    ProvenanceParse { path: PathBuf, reason: String },

    #[error("Cannot resolve version information for '{artifact}': {reason}")]
    ProvenanceResolution { artifact: String, reason: String },

    #[error("Version document is invalid: {0}")]
    VersionDocumentInvalid(String),

    #[error("Cannot inspect signature of '{}': {reason}", bundle.display())]
    Inspection { bundle: PathBuf, reason: String },

    #[error("Signature of '{}' is not valid: {detail}", bundle.display())]
    SignatureInvalid { bundle: PathBuf, detail: String },

    #[error("Signing metadata of '{}' changed after re-signing: {aspect} differs", bundle.display())]
    SignatureDrift { bundle: PathBuf, aspect: String },

    #[error("'{tool}' failed with status {status}: {stderr}")]
    ToolInvocation {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("Build settings error: {0}")]
    BuildSettings(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
