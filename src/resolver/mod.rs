//! # Dependency Provenance Resolution
//!
//! Every direct dependency may have published a `versions.xml` side artifact
//! (classifier `versions`, type `xml`) next to its main artifact. This module
//! looks those up across the configured repositories and turns each one found
//! into a [`DependencyEntry`].
//!
//! Lookups are best effort: a dependency without a side artifact is skipped,
//! while any other failure (transport, corrupt document) aborts resolution.
//! Repositories report the two cases apart through [`SideArtifact`].

use crate::cli::progress::create_progress_bar;
use crate::error::{Error, Result};
use crate::provenance::ProjectIdentity;
use crate::utils::read_file_to_string;
use crate::versioninfo::{DependencyEntry, VersionDocument};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub mod filesystem;
pub mod http;

pub const VERSIONS_CLASSIFIER: &str = "versions";
pub const VERSIONS_TYPE: &str = "xml";

/// Outcome of a side artifact lookup that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideArtifact {
    /// Local path of the resolved file
    Found(PathBuf),
    NotFound,
}

pub trait ArtifactRepository {
    /// Human readable identifier used in log messages
    fn id(&self) -> String;

    fn resolve_side_artifact(
        &self,
        artifact: &ProjectIdentity,
        classifier: &str,
        extension: &str,
    ) -> Result<SideArtifact>;
}

/// Repository-relative path of a classified artifact in the Maven layout:
/// `group/as/dirs/artifact/version/artifact-version-classifier.extension`
pub fn artifact_path(artifact: &ProjectIdentity, classifier: &str, extension: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in artifact.group_id.split('.') {
        path.push(segment);
    }
    path.push(&artifact.artifact_id);
    path.push(&artifact.version);
    path.push(format!(
        "{}-{}-{classifier}.{extension}",
        artifact.artifact_id, artifact.version
    ));
    path
}

/// Try every repository in order. The first hit wins; errors are not retried
/// against the remaining repositories.
pub fn resolve_side_artifact(
    repositories: &[Box<dyn ArtifactRepository>],
    artifact: &ProjectIdentity,
    classifier: &str,
    extension: &str,
) -> Result<SideArtifact> {
    for repo in repositories {
        match repo.resolve_side_artifact(artifact, classifier, extension)? {
            SideArtifact::Found(path) => {
                debug!("Resolved {artifact}:{classifier}:{extension} from {}", repo.id());
                return Ok(SideArtifact::Found(path));
            }
            SideArtifact::NotFound => {
                debug!("{artifact}:{classifier}:{extension} not in {}", repo.id());
            }
        }
    }
    Ok(SideArtifact::NotFound)
}

fn load_entry(artifact: &ProjectIdentity, path: &Path) -> Result<DependencyEntry> {
    let corrupt = |reason: String| Error::ProvenanceResolution {
        artifact: artifact.to_string(),
        reason,
    };

    let content = read_file_to_string(path).map_err(|e| corrupt(e.to_string()))?;
    let doc = VersionDocument::from_xml(&content).map_err(|e| corrupt(e.to_string()))?;

    Ok(DependencyEntry::new(artifact.clone(), doc.provenance).with_dependencies(doc.dependencies))
}

/// Build one [`DependencyEntry`] per dependency that published version
/// information, in the order of `artifacts`.
pub fn resolve_dependencies(
    artifacts: &[ProjectIdentity],
    repositories: &[Box<dyn ArtifactRepository>],
    show_progress: bool,
) -> Result<Vec<DependencyEntry>> {
    let progress = show_progress.then(|| create_progress_bar(artifacts.len() as u64));
    let mut entries = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        if let Some(pb) = &progress {
            pb.set_message(artifact.to_string());
        }

        match resolve_side_artifact(repositories, artifact, VERSIONS_CLASSIFIER, VERSIONS_TYPE)? {
            SideArtifact::Found(path) => {
                entries.push(load_entry(artifact, &path)?);
                info!("Version information retrieved for artifact: {artifact}");
            }
            SideArtifact::NotFound => {
                info!("Could not retrieve version information for artifact: {artifact}");
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(entries)
}
