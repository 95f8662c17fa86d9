//! # Version Info Pipeline
//!
//! Ties the stages together:
//!
//! 1. read `sync.info` (a missing file either fails the build or skips everything)
//! 2. resolve the provenance of every direct dependency, best effort
//! 3. write `versions.xml` and `versions.plist` into the build directory
//! 4. for app packaging, stamp both files into every device bundle and re-sign it
//! 5. attach `versions.xml` to the build outputs

use crate::bundle::BundleLocation;
use crate::bundle::BundleSigner;
use crate::bundle::settings::BuildSettingsSource;
use crate::error::Result;
use crate::provenance::read_sync_info;
use crate::publish::{ArtifactPublisher, PublishedArtifact};
use crate::resolver::{ArtifactRepository, VERSIONS_CLASSIFIER, VERSIONS_TYPE, resolve_dependencies};
use crate::signing::CodesignTool;
use crate::versioninfo::{RenderedDocuments, VersionDocument, write_documents};
use log::info;

pub mod config;

use config::{PackagingType, PipelineConfig};

/// External services the pipeline talks to
pub struct Collaborators<'a> {
    pub repositories: &'a [Box<dyn ArtifactRepository>],
    pub codesign: &'a dyn CodesignTool,
    pub build_settings: &'a dyn BuildSettingsSource,
    pub publisher: &'a dyn ArtifactPublisher,
}

#[derive(Debug)]
pub struct GeneratedDocuments {
    pub document: VersionDocument,
    pub rendered: RenderedDocuments,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    /// No sync info file and not running strict; nothing was written
    Skipped,
    Completed {
        generated: GeneratedDocuments,
        signed_bundles: Vec<BundleLocation>,
        attached: PublishedArtifact,
    },
}

/// Steps 1-3: read provenance, resolve dependencies and write both documents.
///
/// `Ok(None)` means the sync info file is absent and optional.
pub fn generate_documents(
    config: &PipelineConfig,
    repositories: &[Box<dyn ArtifactRepository>],
) -> Result<Option<GeneratedDocuments>> {
    let Some(provenance) = read_sync_info(
        &config.execution_root,
        &config.sync_info_file,
        config.fail_on_missing_sync_info,
    )?
    else {
        return Ok(None);
    };

    let dependencies =
        resolve_dependencies(&config.dependencies, repositories, config.show_progress)?;
    info!(
        "Version information available for {} of {} dependencies",
        dependencies.len(),
        config.dependencies.len()
    );

    let document = VersionDocument::new(config.project.clone(), provenance, dependencies);
    let rendered = write_documents(&document, &config.build_dir)?;

    Ok(Some(GeneratedDocuments { document, rendered }))
}

/// Run the whole pipeline
pub fn attach_version_info(
    config: &PipelineConfig,
    collaborators: &Collaborators<'_>,
) -> Result<PipelineOutcome> {
    let Some(generated) = generate_documents(config, collaborators.repositories)? else {
        return Ok(PipelineOutcome::Skipped);
    };

    let signed_bundles = match config.packaging {
        PackagingType::App => BundleSigner::new(
            collaborators.codesign,
            collaborators.build_settings,
            &config.compile_dir,
            &generated.rendered,
        )
        .run(&config.configurations, &config.sdks)?,
        PackagingType::Lib => Vec::new(),
    };

    let attached = collaborators.publisher.attach(
        &config.project,
        VERSIONS_CLASSIFIER,
        VERSIONS_TYPE,
        &generated.rendered.xml,
    )?;

    Ok(PipelineOutcome::Completed {
        generated,
        signed_bundles,
        attached,
    })
}
