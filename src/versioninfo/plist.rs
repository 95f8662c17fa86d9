//! `versions.plist` rendering.
//!
//! The dictionary mirrors `versions.xml`: `schemaVersion`, `coordinates`
//! (`groupId`, `artifactId`, `version`), `scm` (`host`, `depotPath`,
//! `changelist`) and `dependencies`, an array of dictionaries of the same shape.

use super::{DependencyEntry, SCHEMA_VERSION, VersionDocument};
use crate::error::{Error, Result};
use crate::provenance::{ProjectIdentity, ProvenanceRecord};
use ::plist::{Dictionary, Value};

fn coordinates(id: &ProjectIdentity) -> Value {
    let mut dict = Dictionary::new();
    dict.insert("groupId".to_string(), Value::String(id.group_id.clone()));
    dict.insert(
        "artifactId".to_string(),
        Value::String(id.artifact_id.clone()),
    );
    dict.insert("version".to_string(), Value::String(id.version.clone()));
    Value::Dictionary(dict)
}

fn scm(record: &ProvenanceRecord) -> Value {
    let mut dict = Dictionary::new();
    dict.insert("host".to_string(), Value::String(record.scm_host.clone()));
    dict.insert(
        "depotPath".to_string(),
        Value::String(record.depot_path.clone()),
    );
    dict.insert(
        "changelist".to_string(),
        Value::String(record.changelist.clone()),
    );
    Value::Dictionary(dict)
}

fn dependencies(entries: &[DependencyEntry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                let mut dict = Dictionary::new();
                dict.insert("coordinates".to_string(), coordinates(&entry.identity));
                dict.insert("scm".to_string(), scm(&entry.provenance));
                dict.insert("dependencies".to_string(), dependencies(&entry.dependencies));
                Value::Dictionary(dict)
            })
            .collect(),
    )
}

pub fn to_value(doc: &VersionDocument) -> Value {
    let mut root = Dictionary::new();
    root.insert(
        "schemaVersion".to_string(),
        Value::String(SCHEMA_VERSION.to_string()),
    );
    root.insert("coordinates".to_string(), coordinates(&doc.project));
    root.insert("scm".to_string(), scm(&doc.provenance));
    root.insert("dependencies".to_string(), dependencies(&doc.dependencies));
    Value::Dictionary(root)
}

pub fn render(doc: &VersionDocument) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    to_value(doc)
        .to_writer_xml(&mut out)
        .map_err(|e| Error::Serialization(format!("Failed to render versions.plist: {e}")))?;
    out.push(b'\n');
    Ok(out)
}
