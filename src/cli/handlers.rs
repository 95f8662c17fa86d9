use crate::error::Result;

use super::commands::{ProjectArgs, SignatureCommands, VersionInfoCommands};
use crate::bundle::settings::XcodebuildSettings;
use crate::hash::calculate_hash;
use crate::pipeline::config::{PackagingType, PipelineConfig};
use crate::pipeline::{self, Collaborators, PipelineOutcome};
use crate::publish::FilesystemPublisher;
use crate::resolver::ArtifactRepository;
use crate::resolver::filesystem::FilesystemRepository;
use crate::resolver::http::HttpRepository;
use crate::signing::SignatureInspector;
use crate::signing::codesign::SystemCodesign;
use crate::utils::read_file_to_string;
use std::path::Path;

fn build_repositories(
    urls: &[String],
    cache_dir: &Path,
) -> Result<Vec<Box<dyn ArtifactRepository>>> {
    urls.iter()
        .map(|url| -> Result<Box<dyn ArtifactRepository>> {
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(Box::new(HttpRepository::new(url.as_str(), cache_dir)?))
            } else {
                Ok(Box::new(FilesystemRepository::new(url)))
            }
        })
        .collect()
}

fn pipeline_config(project: ProjectArgs, packaging: PackagingType) -> PipelineConfig {
    let mut config = PipelineConfig::new(project.coordinates);
    config.execution_root = project.execution_root;
    config.sync_info_file = project.sync_info;
    config.fail_on_missing_sync_info = project.fail_on_missing_sync_info;
    config.dependencies = project.dependencies;
    config.build_dir = project.build_dir;
    config.packaging = packaging;
    config.show_progress = project.progress;
    config
}

pub fn handle_version_info_command(cmd: VersionInfoCommands) -> Result<()> {
    match cmd {
        VersionInfoCommands::Attach {
            project,
            packaging,
            compile_dir,
            project_dir,
            configurations,
            sdks,
            attach_dir,
            codesign,
            security,
            xcodebuild,
        } => {
            let repositories = build_repositories(&project.repositories, &project.cache_dir)?;
            let mut config = pipeline_config(project, packaging);
            config.compile_dir = compile_dir;
            config.configurations = configurations;
            config.sdks = sdks;

            let codesign = SystemCodesign::with_programs(codesign, security);
            let build_settings = XcodebuildSettings::with_program(xcodebuild, project_dir);
            let publisher = FilesystemPublisher::new(attach_dir)?;
            let collaborators = Collaborators {
                repositories: &repositories,
                codesign: &codesign,
                build_settings: &build_settings,
                publisher: &publisher,
            };

            match pipeline::attach_version_info(&config, &collaborators)? {
                PipelineOutcome::Skipped => {
                    println!("No sync info found; version info not attached");
                }
                PipelineOutcome::Completed {
                    generated,
                    signed_bundles,
                    attached,
                } => {
                    for bundle in &signed_bundles {
                        println!("Stamped and re-signed {bundle}");
                    }
                    println!(
                        "Attached {} (sha256 {}) with {} dependency entries",
                        attached.path.display(),
                        attached.sha256,
                        generated.document.dependencies.len()
                    );
                }
            }
            Ok(())
        }
        VersionInfoCommands::Render { project, print } => {
            let repositories = build_repositories(&project.repositories, &project.cache_dir)?;
            let config = pipeline_config(project, PackagingType::Lib);

            match pipeline::generate_documents(&config, &repositories)? {
                None => println!("No sync info found; nothing rendered"),
                Some(generated) => {
                    if print {
                        print!("{}", read_file_to_string(&generated.rendered.xml)?);
                    } else {
                        println!("Wrote {}", generated.rendered.xml.display());
                        println!("Wrote {}", generated.rendered.plist.display());
                    }
                }
            }
            Ok(())
        }
    }
}

pub fn handle_signature_command(cmd: SignatureCommands) -> Result<()> {
    match cmd {
        SignatureCommands::Inspect {
            bundle,
            codesign,
            security,
        } => {
            let tool = SystemCodesign::with_programs(codesign, security);
            let snapshot = SignatureInspector::new(&tool).capture(&bundle)?;

            let report = serde_json::json!({
                "bundle": bundle.display().to_string(),
                "entitlements": snapshot
                    .entitlements
                    .as_ref()
                    .map(|e| String::from_utf8_lossy(e).into_owned()),
                "entitlements_sha256": snapshot.entitlements.as_deref().map(calculate_hash),
                "cms_sha256": calculate_hash(&snapshot.cms),
                "cms_size": snapshot.cms.len(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        SignatureCommands::Verify { bundle, codesign } => {
            let tool = SystemCodesign::with_programs(codesign, "security");
            SignatureInspector::new(&tool).verify_signature_valid(&bundle)?;
            println!("Signature of {} is valid", bundle.display());
            Ok(())
        }
    }
}
