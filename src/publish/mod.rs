//! # Artifact Publishing
//!
//! Attaches generated files to the build's outputs under a classifier and
//! type. [`FilesystemPublisher`] writes them in the Maven repository layout, so
//! a directory it publishes to can be read back by
//! [`crate::resolver::filesystem::FilesystemRepository`].

use crate::error::{Error, Result};
use crate::hash::calculate_file_hash;
use crate::provenance::ProjectIdentity;
use crate::resolver::artifact_path;
use crate::utils::{copy_file, read_file_to_string, safe_create_file};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::create_dir_all;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "attachments.json";

/// Record of one attached file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedArtifact {
    pub identity: ProjectIdentity,
    pub classifier: String,
    pub extension: String,
    pub path: PathBuf,
    pub sha256: String,
    pub attached_at: String,
}

pub trait ArtifactPublisher {
    fn attach(
        &self,
        project: &ProjectIdentity,
        classifier: &str,
        extension: &str,
        file: &Path,
    ) -> Result<PublishedArtifact>;
}

#[derive(Debug, Clone)]
pub struct FilesystemPublisher {
    base_path: PathBuf,
}

impl FilesystemPublisher {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            create_dir_all(&path)?;
        }
        Ok(Self { base_path: path })
    }

    /// Attachments recorded so far, oldest first
    pub fn list_attachments(&self) -> Result<Vec<PublishedArtifact>> {
        let index_path = self.base_path.join(INDEX_FILE);
        if !index_path.exists() {
            return Ok(Vec::new());
        }
        let content = read_file_to_string(&index_path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("Failed to parse {INDEX_FILE}: {e}")))
    }

    fn update_index(&self, artifact: &PublishedArtifact) -> Result<()> {
        let mut index = self.list_attachments()?;
        index.retain(|a| {
            !(a.identity == artifact.identity
                && a.classifier == artifact.classifier
                && a.extension == artifact.extension)
        });
        index.push(artifact.clone());

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        safe_create_file(&self.base_path.join(INDEX_FILE), false)?.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl ArtifactPublisher for FilesystemPublisher {
    fn attach(
        &self,
        project: &ProjectIdentity,
        classifier: &str,
        extension: &str,
        file: &Path,
    ) -> Result<PublishedArtifact> {
        let target = self
            .base_path
            .join(artifact_path(project, classifier, extension));
        if let Some(parent) = target.parent() {
            create_dir_all(parent)?;
        }
        copy_file(file, &target)?;

        let artifact = PublishedArtifact {
            identity: project.clone(),
            classifier: classifier.to_string(),
            extension: extension.to_string(),
            sha256: calculate_file_hash(&target)?,
            path: target,
            attached_at: chrono::Utc::now().to_rfc3339(),
        };
        self.update_index(&artifact)?;

        info!(
            "{} '{}' attached as additional artifact.",
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            artifact.path.display()
        );
        Ok(artifact)
    }
}
