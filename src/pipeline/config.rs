use crate::provenance::{ProjectIdentity, SYNC_INFO_FILE};
use std::path::PathBuf;

/// What the build produces; only `App` bundles are stamped and re-signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PackagingType {
    App,
    Lib,
}

pub struct PipelineConfig {
    /// Directory the sync info file is looked up in
    pub execution_root: PathBuf,
    pub sync_info_file: String,
    pub fail_on_missing_sync_info: bool,
    pub project: ProjectIdentity,
    /// Direct dependencies, in resolution order
    pub dependencies: Vec<ProjectIdentity>,
    /// Where versions.xml and versions.plist are written
    pub build_dir: PathBuf,
    pub packaging: PackagingType,
    /// Root of the Xcode build output (`<compile_dir>/build/<config>-<sdk>`)
    pub compile_dir: PathBuf,
    pub configurations: Vec<String>,
    pub sdks: Vec<String>,
    pub show_progress: bool,
}

impl PipelineConfig {
    pub fn new(project: ProjectIdentity) -> Self {
        Self {
            execution_root: PathBuf::from("."),
            sync_info_file: SYNC_INFO_FILE.to_string(),
            fail_on_missing_sync_info: false,
            project,
            dependencies: Vec::new(),
            build_dir: PathBuf::from("target"),
            packaging: PackagingType::App,
            compile_dir: PathBuf::from("target/xcode"),
            configurations: vec!["Release".to_string()],
            sdks: vec!["iphoneos".to_string()],
            show_progress: false,
        }
    }
}
