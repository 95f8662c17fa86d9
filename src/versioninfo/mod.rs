//! # Version Info
//!
//! The canonical version record of a build: who was built (coordinates), from
//! where (SCM provenance) and out of what (the provenance of every direct
//! dependency that published one). The record is rendered twice:
//!
//! - [`xml`]: `versions.xml`, schema version [`SCHEMA_VERSION`], validated after rendering
//! - [`plist`]: `versions.plist`, the same data as an XML property list
//!
//! Both renderings are pure projections of one immutable [`VersionDocument`];
//! neither is derived from the other's bytes.
//!
//! ## Examples
//!
//! ```
//! use versionstamp::provenance::{ProjectIdentity, ProvenanceRecord};
//! use versionstamp::versioninfo::VersionDocument;
//!
//! let doc = VersionDocument::new(
//!     ProjectIdentity::new("com.example", "app", "1.2.3"),
//!     ProvenanceRecord::new("p4server:1666", "//depot/app", "4821"),
//!     vec![],
//! );
//! let xml = doc.to_xml().unwrap();
//! assert!(xml.contains("<changelist>4821</changelist>"));
//! ```

use crate::error::Result;
use crate::provenance::{ProjectIdentity, ProvenanceRecord};
use crate::utils::safe_create_file;
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod plist;
pub mod xml;

/// Schema version written to and required of every `versions.xml`
pub const SCHEMA_VERSION: &str = "1.2.2";

pub const VERSIONS_XML: &str = "versions.xml";
pub const VERSIONS_PLIST: &str = "versions.plist";

/// Provenance of one dependency, including whatever it recorded about its own dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub identity: ProjectIdentity,
    pub provenance: ProvenanceRecord,
    pub dependencies: Vec<DependencyEntry>,
}

impl DependencyEntry {
    pub fn new(identity: ProjectIdentity, provenance: ProvenanceRecord) -> Self {
        Self {
            identity,
            provenance,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<DependencyEntry>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDocument {
    pub project: ProjectIdentity,
    pub provenance: ProvenanceRecord,
    pub dependencies: Vec<DependencyEntry>,
}

impl VersionDocument {
    pub fn new(
        project: ProjectIdentity,
        provenance: ProvenanceRecord,
        dependencies: Vec<DependencyEntry>,
    ) -> Self {
        Self {
            project,
            provenance,
            dependencies,
        }
    }

    /// Render `versions.xml`. The output is validated before it is returned.
    pub fn to_xml(&self) -> Result<String> {
        let rendered = xml::render(self)?;
        xml::validate(&rendered, self)?;
        Ok(rendered)
    }

    /// Render `versions.plist`
    pub fn to_plist(&self) -> Result<Vec<u8>> {
        plist::render(self)
    }

    /// Read a `versions.xml` document, as published next to a dependency
    pub fn from_xml(content: &str) -> Result<Self> {
        xml::parse(content)
    }
}

/// On-disk locations of the two rendered documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocuments {
    pub xml: PathBuf,
    pub plist: PathBuf,
}

/// Write `versions.xml` and `versions.plist` into `dir`, replacing earlier copies
pub fn write_documents(doc: &VersionDocument, dir: &Path) -> Result<RenderedDocuments> {
    fs::create_dir_all(dir)?;

    let xml_path = dir.join(VERSIONS_XML);
    let markup = doc.to_xml()?;
    safe_create_file(&xml_path, false)?.write_all(markup.as_bytes())?;
    info!("Created '{}'", xml_path.display());

    let plist_path = dir.join(VERSIONS_PLIST);
    if plist_path.exists() {
        fs::remove_file(&plist_path)?;
    }
    let plist = doc.to_plist()?;
    safe_create_file(&plist_path, false)?.write_all(&plist)?;
    info!("Created '{}'", plist_path.display());

    Ok(RenderedDocuments {
        xml: xml_path,
        plist: plist_path,
    })
}


#[cfg(test)]
mod tests {
    use super::test_utils::sample_document;
    use super::*;
    use crate::utils::read_file_to_string;
    use tempfile::tempdir;

    #[test]
    fn test_write_documents() -> Result<()> {
        let dir = tempdir()?;
        let doc = sample_document();

        let rendered = write_documents(&doc, dir.path())?;

        assert_eq!(rendered.xml, dir.path().join(VERSIONS_XML));
        assert_eq!(rendered.plist, dir.path().join(VERSIONS_PLIST));
        let xml = read_file_to_string(&rendered.xml)?;
        assert_eq!(VersionDocument::from_xml(&xml)?, doc);
        let plist = read_file_to_string(&rendered.plist)?;
        assert!(plist.contains("<string>4821</string>"));
        Ok(())
    }

    #[test]
    fn test_write_documents_replaces_previous() -> Result<()> {
        let dir = tempdir()?;
        write_documents(&sample_document(), dir.path())?;

        let mut doc = sample_document();
        doc.provenance.changelist = "5000".to_string();
        doc.dependencies.clear();
        let rendered = write_documents(&doc, dir.path())?;

        let plist = read_file_to_string(&rendered.plist)?;
        assert!(plist.contains("<string>5000</string>"));
        assert!(!plist.contains("4700"));
        Ok(())
    }

    #[test]
    fn test_render_idempotent() -> Result<()> {
        let first = sample_document().to_xml()?;
        let second = VersionDocument::from_xml(&first)?.to_xml()?;
        assert_eq!(first, second);
        Ok(())
    }
}
