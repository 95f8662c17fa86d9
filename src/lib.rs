//! # versionstamp
//!
//! Build-time provenance for iOS app bundles.
//!
//! `versionstamp` records where a build came from (the SCM location and
//! changelist in `sync.info`, plus the same information published by each
//! direct dependency) into `versions.xml` and `versions.plist`, copies both
//! into every device app bundle, re-signs the bundles and proves the
//! re-signing kept their entitlements and signing certificates intact.
//!
//! ## Quick Start
//!
//! ```bash
//! versionstamp version-info attach \
//!     --coordinates=com.example:app:1.2.3 \
//!     --dependency=com.example:core:2.0.0 \
//!     --repository=https://repo.example.com/releases \
//!     --configuration=Release --sdk=iphoneos,iphonesimulator
//! ```
//!
//! The library entry point is [`pipeline::attach_version_info`].

pub mod bundle;
pub mod cli;
pub mod error;
pub mod hash;
pub mod pipeline;
pub mod provenance;
pub mod publish;
pub mod resolver;
pub mod signing;
#[cfg(test)]
mod tests;
pub mod utils;
pub mod versioninfo;

// Re-export error types
pub use error::{Error, Result};

/// Initialize logging for the CLI
///
/// # Examples
///
/// ```
/// use versionstamp::init_logging;
///
/// // Might fail if a logger is already installed
/// let result = init_logging();
/// assert!(result.is_ok() || result.is_err());
/// ```
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}

// Re-export commonly used types and traits
pub use pipeline::{Collaborators, PipelineOutcome, attach_version_info};
pub use resolver::ArtifactRepository;
pub use signing::CodesignTool;
