//! `versions.xml` rendering, parsing and validation.
//!
//! ```text
//! <versions schemaVersion="1.2.2">
//!   <coordinates><groupId/><artifactId/><version/></coordinates>
//!   <scm><host/><depotPath/><changelist/></scm>
//!   <dependencies>
//!     <dependency>
//!       <coordinates/> <scm/> <dependencies/>
//!     </dependency>
//!   </dependencies>
//! </versions>
//! ```

use super::{DependencyEntry, SCHEMA_VERSION, VersionDocument};
use crate::error::{Error, Result};
use crate::provenance::{ProjectIdentity, ProvenanceRecord};
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const ROOT_ELEMENT: &str = "versions";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "versions")]
struct VersionsXml {
    #[serde(rename = "@schemaVersion")]
    schema_version: String,
    coordinates: CoordinatesXml,
    scm: ScmXml,
    #[serde(default, skip_serializing_if = "DependenciesXml::is_empty")]
    dependencies: DependenciesXml,
}

#[derive(Debug, Serialize, Deserialize)]
struct CoordinatesXml {
    #[serde(rename = "groupId")]
    group_id: String,
    #[serde(rename = "artifactId")]
    artifact_id: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScmXml {
    host: String,
    #[serde(rename = "depotPath")]
    depot_path: String,
    changelist: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DependenciesXml {
    #[serde(default)]
    dependency: Vec<DependencyXml>,
}

impl DependenciesXml {
    fn is_empty(&self) -> bool {
        self.dependency.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DependencyXml {
    coordinates: CoordinatesXml,
    scm: ScmXml,
    #[serde(default, skip_serializing_if = "DependenciesXml::is_empty")]
    dependencies: DependenciesXml,
}

impl From<&ProjectIdentity> for CoordinatesXml {
    fn from(id: &ProjectIdentity) -> Self {
        Self {
            group_id: id.group_id.clone(),
            artifact_id: id.artifact_id.clone(),
            version: id.version.clone(),
        }
    }
}

impl From<CoordinatesXml> for ProjectIdentity {
    fn from(c: CoordinatesXml) -> Self {
        ProjectIdentity::new(c.group_id, c.artifact_id, c.version)
    }
}

impl From<&ProvenanceRecord> for ScmXml {
    fn from(p: &ProvenanceRecord) -> Self {
        Self {
            host: p.scm_host.clone(),
            depot_path: p.depot_path.clone(),
            changelist: p.changelist.clone(),
        }
    }
}

impl From<ScmXml> for ProvenanceRecord {
    fn from(s: ScmXml) -> Self {
        ProvenanceRecord::new(s.host, s.depot_path, s.changelist)
    }
}

fn to_dependencies_xml(entries: &[DependencyEntry]) -> DependenciesXml {
    DependenciesXml {
        dependency: entries
            .iter()
            .map(|entry| DependencyXml {
                coordinates: (&entry.identity).into(),
                scm: (&entry.provenance).into(),
                dependencies: to_dependencies_xml(&entry.dependencies),
            })
            .collect(),
    }
}

fn from_dependencies_xml(deps: DependenciesXml) -> Vec<DependencyEntry> {
    deps.dependency
        .into_iter()
        .map(|dep| {
            DependencyEntry::new(dep.coordinates.into(), dep.scm.into())
                .with_dependencies(from_dependencies_xml(dep.dependencies))
        })
        .collect()
}

/// Render the document without validating it
pub fn render(doc: &VersionDocument) -> Result<String> {
    let versions = VersionsXml {
        schema_version: SCHEMA_VERSION.to_string(),
        coordinates: (&doc.project).into(),
        scm: (&doc.provenance).into(),
        dependencies: to_dependencies_xml(&doc.dependencies),
    };

    let mut body = String::new();
    let mut ser = Serializer::with_root(&mut body, Some(ROOT_ELEMENT))
        .map_err(|e| Error::Serialization(e.to_string()))?;
    ser.indent(' ', 2);
    versions
        .serialize(ser)
        .map_err(|e| Error::Serialization(format!("Failed to render versions.xml: {e}")))?;

    let mut out = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
    out.push_str(XML_DECLARATION);
    out.push_str(&body);
    out.push('\n');
    Ok(out)
}

/// Parse a `versions.xml` document and check it against the schema rules
pub fn parse(content: &str) -> Result<VersionDocument> {
    let versions: VersionsXml = quick_xml::de::from_str(content)
        .map_err(|e| Error::Serialization(format!("Failed to parse versions.xml: {e}")))?;
    check_schema(&versions).map_err(Error::Serialization)?;

    Ok(VersionDocument {
        project: versions.coordinates.into(),
        provenance: versions.scm.into(),
        dependencies: from_dependencies_xml(versions.dependencies),
    })
}

/// Check that `rendered` is a well-formed document of the current schema
/// version that carries exactly the data of `expected`.
pub fn validate(rendered: &str, expected: &VersionDocument) -> Result<()> {
    let versions: VersionsXml = quick_xml::de::from_str(rendered)
        .map_err(|e| Error::VersionDocumentInvalid(e.to_string()))?;
    check_schema(&versions).map_err(Error::VersionDocumentInvalid)?;

    let parsed = VersionDocument {
        project: versions.coordinates.into(),
        provenance: versions.scm.into(),
        dependencies: from_dependencies_xml(versions.dependencies),
    };
    if &parsed != expected {
        return Err(Error::VersionDocumentInvalid(
            "rendered document does not match its source".to_string(),
        ));
    }
    Ok(())
}

fn check_schema(versions: &VersionsXml) -> std::result::Result<(), String> {
    if versions.schema_version != SCHEMA_VERSION {
        return Err(format!(
            "unsupported schema version '{}', expected '{SCHEMA_VERSION}'",
            versions.schema_version
        ));
    }
    check_node("versions", &versions.coordinates, &versions.scm)?;
    check_dependencies(&versions.dependencies)
}

fn check_dependencies(deps: &DependenciesXml) -> std::result::Result<(), String> {
    for dep in &deps.dependency {
        check_node("dependency", &dep.coordinates, &dep.scm)?;
        check_dependencies(&dep.dependencies)?;
    }
    Ok(())
}

fn check_node(
    node: &str,
    coordinates: &CoordinatesXml,
    scm: &ScmXml,
) -> std::result::Result<(), String> {
    let fields = [
        ("groupId", &coordinates.group_id),
        ("artifactId", &coordinates.artifact_id),
        ("version", &coordinates.version),
        ("host", &scm.host),
        ("depotPath", &scm.depot_path),
        ("changelist", &scm.changelist),
    ];
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(format!("<{node}> has an empty <{name}>")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioninfo::test_utils::sample_document;

    #[test]
    fn test_render_shape() -> Result<()> {
        let xml = render(&sample_document())?;

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<versions schemaVersion=\"1.2.2\">"));
        assert!(xml.contains("<groupId>com.example</groupId>"));
        assert!(xml.contains("<depotPath>//depot/app</depotPath>"));
        assert_eq!(xml.matches("<dependency>").count(), 3);
        Ok(())
    }

    #[test]
    fn test_dependency_order_preserved() -> Result<()> {
        let xml = render(&sample_document())?;
        let core = xml.find("<artifactId>core</artifactId>").unwrap();
        let util = xml.find("<artifactId>util</artifactId>").unwrap();
        let net = xml.find("<artifactId>net</artifactId>").unwrap();
        assert!(core < util && util < net);
        Ok(())
    }

    #[test]
    fn test_render_is_deterministic() -> Result<()> {
        let doc = sample_document();
        assert_eq!(render(&doc)?, render(&doc.clone())?);
        Ok(())
    }

    #[test]
    fn test_parse_round_trip() -> Result<()> {
        let doc = sample_document();
        assert_eq!(parse(&render(&doc)?)?, doc);
        Ok(())
    }

    #[test]
    fn test_special_characters_escaped() -> Result<()> {
        let mut doc = sample_document();
        doc.provenance.depot_path = "//depot/a&b/<x>".to_string();
        let xml = doc.to_xml()?;
        assert!(!xml.contains("a&b/<x>"));
        assert_eq!(parse(&xml)?.provenance.depot_path, "//depot/a&b/<x>");
        Ok(())
    }

    #[test]
    fn test_wrong_schema_version_rejected() {
        let xml = render(&sample_document())
            .unwrap()
            .replace("schemaVersion=\"1.2.2\"", "schemaVersion=\"1.0.0\"");
        assert!(matches!(parse(&xml), Err(Error::Serialization(_))));
        assert!(matches!(
            validate(&xml, &sample_document()),
            Err(Error::VersionDocumentInvalid(_))
        ));
    }

    #[test]
    fn test_empty_field_fails_validation() {
        let mut doc = sample_document();
        doc.dependencies[1].provenance.changelist = String::new();
        assert!(matches!(doc.to_xml(), Err(Error::VersionDocumentInvalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse("<versions><coordinates>").is_err());
        assert!(parse("not xml at all").is_err());
    }

    #[test]
    fn test_validate_detects_mismatch() -> Result<()> {
        let xml = render(&sample_document())?;
        let mut other = sample_document();
        other.dependencies.pop();
        assert!(matches!(
            validate(&xml, &other),
            Err(Error::VersionDocumentInvalid(_))
        ));
        Ok(())
    }
}
