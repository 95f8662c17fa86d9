use super::{ArtifactRepository, SideArtifact, artifact_path};
use crate::cli::{CLI_NAME, CLI_VERSION};
use crate::error::{Error, Result};
use crate::provenance::ProjectIdentity;
use crate::utils::safe_create_file;
use log::debug;
use reqwest::StatusCode;
use std::io::Write;
use std::path::PathBuf;

/// Remote Maven-layout repository reached over HTTP(S).
///
/// Downloads land in `cache_dir` under the same relative layout.
pub struct HttpRepository {
    client: reqwest::blocking::Client,
    base_url: String,
    cache_dir: PathBuf,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("{CLI_NAME}/{CLI_VERSION}"))
            .build()
            .map_err(|e| Error::InitializationError(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(client, base_url, cache_dir))
    }

    pub fn with_client(
        client: reqwest::blocking::Client,
        base_url: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    fn url_for(&self, relative: &std::path::Path) -> String {
        let segments: Vec<String> = relative
            .iter()
            .map(|c| c.to_string_lossy().into_owned())
            .collect();
        format!("{}/{}", self.base_url, segments.join("/"))
    }
}

impl ArtifactRepository for HttpRepository {
    fn id(&self) -> String {
        self.base_url.clone()
    }

    fn resolve_side_artifact(
        &self,
        artifact: &ProjectIdentity,
        classifier: &str,
        extension: &str,
    ) -> Result<SideArtifact> {
        let relative = artifact_path(artifact, classifier, extension);
        let url = self.url_for(&relative);
        let failed = |reason: String| Error::ProvenanceResolution {
            artifact: format!("{artifact}:{classifier}:{extension}"),
            reason,
        };

        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| failed(format!("request to {url} failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(SideArtifact::NotFound),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .map_err(|e| failed(format!("reading {url} failed: {e}")))?;
                let target = self.cache_dir.join(&relative);
                safe_create_file(&target, false)
                    .and_then(|mut file| Ok(file.write_all(&body)?))
                    .map_err(|e| failed(format!("caching {url} failed: {e}")))?;
                Ok(SideArtifact::Found(target))
            }
            status => Err(failed(format!("{url} returned {status}"))),
        }
    }
}
