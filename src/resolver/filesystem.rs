use super::{ArtifactRepository, SideArtifact, artifact_path};
use crate::error::Result;
use crate::provenance::ProjectIdentity;
use std::path::{Path, PathBuf};

/// Repository laid out like a local Maven repository (`~/.m2/repository`)
#[derive(Debug, Clone)]
pub struct FilesystemRepository {
    base_path: PathBuf,
}

impl FilesystemRepository {
    pub fn new<P: AsRef<Path>>(url: P) -> Self {
        let path_str = url.as_ref().to_string_lossy();
        let path = match path_str.strip_prefix("file://") {
            Some(stripped) => PathBuf::from(stripped),
            None => PathBuf::from(path_str.to_string()),
        };
        Self { base_path: path }
    }
}

impl ArtifactRepository for FilesystemRepository {
    fn id(&self) -> String {
        format!("file://{}", self.base_path.display())
    }

    fn resolve_side_artifact(
        &self,
        artifact: &ProjectIdentity,
        classifier: &str,
        extension: &str,
    ) -> Result<SideArtifact> {
        let path = self
            .base_path
            .join(artifact_path(artifact, classifier, extension));
        if path.is_file() {
            Ok(SideArtifact::Found(path))
        } else {
            Ok(SideArtifact::NotFound)
        }
    }
}
