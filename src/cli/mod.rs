pub mod commands;
pub mod handlers;
use crate::error::Error;

// Re-export commonly used items
pub use commands::{ProjectArgs, SignatureCommands, VersionInfoCommands};
pub use handlers::{handle_signature_command, handle_version_info_command};

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLI_NAME: &str = "versionstamp";

pub fn format_error(error: &Error) -> String {
    match error {
        Error::Io(err) => format!("IO error: {err}"),
        Error::MissingProvenanceFile(_) => format!("Missing provenance: {error}"),
        Error::ProvenanceParse { .. } => format!("Provenance error: {error}"),
        Error::ProvenanceResolution { .. } => format!("Dependency resolution error: {error}"),
        Error::VersionDocumentInvalid(msg) => format!("Invalid version document: {msg}"),
        Error::Inspection { .. } => format!("Inspection error: {error}"),
        Error::SignatureInvalid { .. } => format!("Signature error: {error}"),
        Error::SignatureDrift { .. } => format!("Signature drift: {error}"),
        Error::ToolInvocation { .. } => format!("Tool error: {error}"),
        Error::BuildSettings(msg) => format!("Build settings error: {msg}"),
        Error::Serialization(msg) => format!("Serialization error: {msg}"),
        Error::Validation(msg) => format!("Validation error: {msg}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
        Error::Json(err) => format!("JSON error: {err}"),
    }
}

// Shared functionality for progress indication
pub mod progress {
    use indicatif::{ProgressBar, ProgressStyle};

    pub fn create_progress_bar(len: u64) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }
}
