use crate::pipeline::config::PackagingType;
use crate::provenance::ProjectIdentity;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Inputs shared by every command that generates version documents
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project coordinates (groupId:artifactId:version)
    #[arg(long = "coordinates")]
    pub coordinates: ProjectIdentity,

    /// Direct dependencies in resolution order (comma-separated groupId:artifactId:version)
    #[arg(long = "dependency", value_delimiter = ',')]
    pub dependencies: Vec<ProjectIdentity>,

    /// Repositories to look up dependency version info in (URL or directory)
    #[arg(long = "repository")]
    pub repositories: Vec<String>,

    /// Directory downloaded version info is cached in
    #[arg(long = "cache-dir", default_value = "target/versionstamp-cache")]
    pub cache_dir: PathBuf,

    /// Directory containing the sync info file
    #[arg(long = "execution-root", default_value = ".")]
    pub execution_root: PathBuf,

    /// Name of the sync info file
    #[arg(long = "sync-info", default_value = "sync.info")]
    pub sync_info: String,

    /// Fail when the sync info file is missing instead of skipping
    #[arg(long = "fail-on-missing-sync-info")]
    pub fail_on_missing_sync_info: bool,

    /// Directory versions.xml and versions.plist are written to
    #[arg(long = "build-dir", default_value = "target")]
    pub build_dir: PathBuf,

    /// Show a progress bar while resolving dependencies
    #[arg(long = "progress")]
    pub progress: bool,
}

#[derive(Debug, Subcommand)]
pub enum VersionInfoCommands {
    /// Generate version info, stamp it into device bundles, re-sign and attach it
    Attach {
        #[command(flatten)]
        project: ProjectArgs,

        /// Packaging type of the project
        #[arg(long = "packaging", value_enum, default_value = "app")]
        packaging: PackagingType,

        /// Xcode build output root
        #[arg(long = "compile-dir", default_value = "target/xcode")]
        compile_dir: PathBuf,

        /// Xcode working copy build settings are read from
        #[arg(long = "project-dir", default_value = ".")]
        project_dir: PathBuf,

        /// Build configurations (comma-separated)
        #[arg(long = "configuration", value_delimiter = ',', default_value = "Release")]
        configurations: Vec<String>,

        /// SDKs (comma-separated)
        #[arg(long = "sdk", value_delimiter = ',', default_value = "iphoneos")]
        sdks: Vec<String>,

        /// Directory versions.xml is attached to
        #[arg(long = "attach-dir", default_value = "target/attached")]
        attach_dir: PathBuf,

        /// codesign executable
        #[arg(long = "codesign", default_value = "codesign")]
        codesign: PathBuf,

        /// security executable
        #[arg(long = "security", default_value = "security")]
        security: PathBuf,

        /// xcodebuild executable
        #[arg(long = "xcodebuild", default_value = "xcodebuild")]
        xcodebuild: PathBuf,
    },
    /// Only generate versions.xml and versions.plist
    Render {
        #[command(flatten)]
        project: ProjectArgs,

        /// Also print versions.xml to stdout
        #[arg(long = "print")]
        print: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum SignatureCommands {
    /// Print the signing metadata of a bundle
    Inspect {
        /// Path to the .app bundle
        #[arg(long = "bundle")]
        bundle: PathBuf,

        /// codesign executable
        #[arg(long = "codesign", default_value = "codesign")]
        codesign: PathBuf,

        /// security executable
        #[arg(long = "security", default_value = "security")]
        security: PathBuf,
    },
    /// Check that a bundle's signature is valid
    Verify {
        /// Path to the .app bundle
        #[arg(long = "bundle")]
        bundle: PathBuf,

        /// codesign executable
        #[arg(long = "codesign", default_value = "codesign")]
        codesign: PathBuf,
    },
}
