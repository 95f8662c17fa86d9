//! # Provenance
//!
//! Identity and source-control provenance of the project being built, and the
//! reader for the `sync.info` file the SCM checkout leaves in the execution root.
//!
//! The `sync.info` file is a property file with three required entries:
//!
//! ```text
//! port=p4server:1666
//! depotpath=//depot/app
//! changelist=4821
//! ```
//!
//! `port` is the SCM server hosting the project, `depotpath` the location of the
//! project on that server and `changelist` the revision that was synced.
//!
//! ## Examples
//!
//! ```
//! use versionstamp::provenance::ProvenanceRecord;
//!
//! let record = ProvenanceRecord::parse("port=p4server:1666\ndepotpath=//depot/app\nchangelist=4821\n")
//!     .unwrap();
//! assert_eq!(record.changelist, "4821");
//! ```

use crate::error::{Error, Result};
use crate::utils::read_file_to_string;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod properties;

/// Default name of the provenance file in the execution root
pub const SYNC_INFO_FILE: &str = "sync.info";

pub const KEY_SCM_HOST: &str = "port";
pub const KEY_DEPOT_PATH: &str = "depotpath";
pub const KEY_CHANGELIST: &str = "changelist";

/// Maven-style coordinates of the project or of one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectIdentity {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ProjectIdentity {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Parses `groupId:artifactId:version`. Trailing segments (type, scope) are ignored.
impl FromStr for ProjectIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 3 || parts[..3].iter().any(|p| p.trim().is_empty()) {
            return Err(Error::Validation(format!(
                "Invalid coordinates '{s}', expected groupId:artifactId:version"
            )));
        }
        Ok(Self::new(parts[0].trim(), parts[1].trim(), parts[2].trim()))
    }
}

/// SCM location and revision of one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub scm_host: String,
    pub depot_path: String,
    pub changelist: String,
}

impl ProvenanceRecord {
    pub fn new(
        scm_host: impl Into<String>,
        depot_path: impl Into<String>,
        changelist: impl Into<String>,
    ) -> Self {
        Self {
            scm_host: scm_host.into(),
            depot_path: depot_path.into(),
            changelist: changelist.into(),
        }
    }

    /// Parse property-file content holding the three provenance keys.
    ///
    /// Keys other than `port`, `depotpath` and `changelist` are ignored; each of
    /// the three must be present with a non-empty value.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let props = properties::parse(content)?;
        Self::from_properties(&props)
    }

    pub fn from_properties(
        props: &HashMap<String, String>,
    ) -> std::result::Result<Self, String> {
        let required = |key: &str| -> std::result::Result<String, String> {
            match props.get(key).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                Some(_) => Err(format!("entry '{key}' is empty")),
                None => Err(format!("missing entry '{key}'")),
            }
        };

        Ok(Self {
            scm_host: required(KEY_SCM_HOST)?,
            depot_path: required(KEY_DEPOT_PATH)?,
            changelist: required(KEY_CHANGELIST)?,
        })
    }
}

/// Load the project's provenance from `root/file_name`.
///
/// Returns `Ok(None)` when the file does not exist and `fail_on_missing` is
/// off; callers skip the rest of the pipeline in that case.
pub fn read_sync_info(
    root: &Path,
    file_name: &str,
    fail_on_missing: bool,
) -> Result<Option<ProvenanceRecord>> {
    let path = root.join(file_name);

    if !path.exists() {
        if fail_on_missing {
            return Err(Error::MissingProvenanceFile(path));
        }
        info!(
            "The optional sync info file '{}' not found. Cannot attach versions.xml to build results.",
            path.display()
        );
        return Ok(None);
    }

    info!(
        "Sync info file found: '{}'. Creating versions.xml file.",
        path.display()
    );

    let content = read_file_to_string(&path)?;
    let record = ProvenanceRecord::parse(&content).map_err(|reason| Error::ProvenanceParse {
        path: path.clone(),
        reason,
    })?;
    debug!(
        "Provenance: host={} depot={} changelist={}",
        record.scm_host, record.depot_path, record.changelist
    );

    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::safe_create_file;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_sync_info(dir: &Path, content: &str) -> Result<()> {
        let mut file = safe_create_file(&dir.join(SYNC_INFO_FILE), false)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    #[test]
    fn test_read_sync_info_present() -> Result<()> {
        let dir = tempdir()?;
        write_sync_info(
            dir.path(),
            "# synced by p4\nport=p4server:1666\ndepotpath=//depot/app\nchangelist=4821\n",
        )?;

        let record = read_sync_info(dir.path(), SYNC_INFO_FILE, true)?;

        assert_eq!(
            record,
            Some(ProvenanceRecord::new("p4server:1666", "//depot/app", "4821"))
        );
        Ok(())
    }

    #[test]
    fn test_missing_sync_info_lenient() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_sync_info(dir.path(), SYNC_INFO_FILE, false)?, None);
        Ok(())
    }

    #[test]
    fn test_missing_sync_info_strict() -> Result<()> {
        let dir = tempdir()?;
        match read_sync_info(dir.path(), SYNC_INFO_FILE, true) {
            Err(Error::MissingProvenanceFile(path)) => {
                assert_eq!(path, dir.path().join(SYNC_INFO_FILE));
            }
            other => panic!("Expected MissingProvenanceFile, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_malformed_sync_info() -> Result<()> {
        let dir = tempdir()?;
        write_sync_info(dir.path(), "port=p4server:1666\nchangelist=4821\n")?;

        let result = read_sync_info(dir.path(), SYNC_INFO_FILE, false);

        assert!(
            matches!(result, Err(Error::ProvenanceParse { ref reason, .. }) if reason.contains("depotpath"))
        );
        Ok(())
    }

    #[test]
    fn test_empty_value_rejected() {
        let result = ProvenanceRecord::parse("port=\ndepotpath=//depot/app\nchangelist=1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_key_order_irrelevant() {
        let record =
            ProvenanceRecord::parse("changelist : 7\ndepotpath //depot/lib\nport=host:1666\n")
                .unwrap();
        assert_eq!(record, ProvenanceRecord::new("host:1666", "//depot/lib", "7"));
    }

    #[test]
    fn test_identity_from_str() -> Result<()> {
        let id: ProjectIdentity = "com.example:app:1.2.3".parse()?;
        assert_eq!(id, ProjectIdentity::new("com.example", "app", "1.2.3"));
        assert_eq!(id.to_string(), "com.example:app:1.2.3");

        let with_type: ProjectIdentity = "com.example:lib:2.0:headers.tar".parse()?;
        assert_eq!(with_type.version, "2.0");

        assert!("com.example:app".parse::<ProjectIdentity>().is_err());
        assert!("com.example::1.0".parse::<ProjectIdentity>().is_err());
        Ok(())
    }
}
