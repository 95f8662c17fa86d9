//! # Bundle Stamping and Re-signing
//!
//! For every (configuration, sdk) pair that targets a device, the compiled app
//! bundle is walked through
//!
//! ```text
//! Located -> PreVerified -> Stamped -> Signed -> PostVerified -> Done
//!
//! any step -> Failed
//! ```
//!
//! The existing signature must verify before anything is touched. The version
//! documents are then copied into the bundle, the bundle is re-signed, and the
//! new signature must both verify and carry the same entitlements and CMS
//! message as before. The first failure aborts the whole run.

use crate::error::{Error, Result};
use crate::signing::{CodesignTool, SignatureInspector, verify_equivalent};
use crate::utils::copy_file;
use crate::versioninfo::{RenderedDocuments, VERSIONS_PLIST, VERSIONS_XML};
use log::{debug, error, info};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod settings;

use settings::{BuildSettingsSource, CODE_SIGN_IDENTITY, CODESIGNING_FOLDER_PATH, PRODUCT_NAME};

/// SDK name prefix of device (as opposed to simulator) builds
pub const DEVICE_SDK_PREFIX: &str = "iphoneos";

pub fn is_device_sdk(sdk: &str) -> bool {
    sdk.starts_with(DEVICE_SDK_PREFIX)
}

/// Folder holding the build products of one configuration and sdk
pub fn products_folder(compile_dir: &Path, configuration: &str, sdk: &str) -> PathBuf {
    compile_dir
        .join("build")
        .join(format!("{configuration}-{sdk}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLocation {
    pub configuration: String,
    pub sdk: String,
    pub path: PathBuf,
}

impl fmt::Display for BundleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}-{})",
            self.path.display(),
            self.configuration,
            self.sdk
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningState {
    Located,
    PreVerified,
    Stamped,
    Signed,
    PostVerified,
    Done,
    Failed,
}

pub struct BundleSigner<'a> {
    tool: &'a dyn CodesignTool,
    settings: &'a dyn BuildSettingsSource,
    compile_dir: PathBuf,
    documents: &'a RenderedDocuments,
}

impl<'a> BundleSigner<'a> {
    pub fn new(
        tool: &'a dyn CodesignTool,
        settings: &'a dyn BuildSettingsSource,
        compile_dir: impl Into<PathBuf>,
        documents: &'a RenderedDocuments,
    ) -> Self {
        Self {
            tool,
            settings,
            compile_dir: compile_dir.into(),
            documents,
        }
    }

    /// Stamp and re-sign every device bundle. Simulator pairs are skipped.
    pub fn run(&self, configurations: &[String], sdks: &[String]) -> Result<Vec<BundleLocation>> {
        let mut signed = Vec::new();

        for configuration in configurations {
            for sdk in sdks {
                if !is_device_sdk(sdk) {
                    debug!("Skipping {configuration}-{sdk}: not a device sdk");
                    continue;
                }
                let location = self.locate(configuration, sdk)?;
                self.stamp_and_sign(&location)?;
                signed.push(location);
            }
        }

        Ok(signed)
    }

    pub fn locate(&self, configuration: &str, sdk: &str) -> Result<BundleLocation> {
        let product_name = self
            .settings
            .settings(configuration, sdk)?
            .get(PRODUCT_NAME)?
            .to_string();
        let path = products_folder(&self.compile_dir, configuration, sdk)
            .join(format!("{product_name}.app"));

        if !path.is_dir() {
            return Err(Error::Validation(format!(
                "App bundle not found: {}",
                path.display()
            )));
        }

        Ok(BundleLocation {
            configuration: configuration.to_string(),
            sdk: sdk.to_string(),
            path,
        })
    }

    /// Drive one located bundle from `Located` to `Done`
    pub fn stamp_and_sign(&self, location: &BundleLocation) -> Result<()> {
        let mut state = SigningState::Located;
        self.drive(location, &mut state)
    }

    /// Like [`Self::stamp_and_sign`], leaving the reached state in `state`.
    /// Any error moves it to `Failed`.
    pub fn drive(&self, location: &BundleLocation, state: &mut SigningState) -> Result<()> {
        let result = self.advance(location, state);
        if let Err(e) = &result {
            error!("Signing {location} failed after {state:?}: {e}");
            transition(location, state, SigningState::Failed);
        }
        result
    }

    fn advance(&self, location: &BundleLocation, state: &mut SigningState) -> Result<()> {
        let inspector = SignatureInspector::new(self.tool);
        let bundle = location.path.as_path();

        inspector.verify_signature_valid(bundle)?;
        let before = inspector.capture(bundle)?;
        transition(location, state, SigningState::PreVerified);

        self.stamp(bundle)?;
        transition(location, state, SigningState::Stamped);

        self.sign(location)?;
        transition(location, state, SigningState::Signed);

        let after = inspector.capture(bundle)?;
        inspector.verify_signature_valid(bundle)?;
        verify_equivalent(bundle, &before, &after)?;
        transition(location, state, SigningState::PostVerified);

        transition(location, state, SigningState::Done);
        Ok(())
    }

    fn stamp(&self, bundle: &Path) -> Result<()> {
        for (source, name) in [
            (&self.documents.xml, VERSIONS_XML),
            (&self.documents.plist, VERSIONS_PLIST),
        ] {
            let target = bundle.join(name);
            copy_file(source, &target)?;
            info!(
                "{name} copied from '{}' to '{}'",
                source.display(),
                target.display()
            );
        }
        Ok(())
    }

    fn sign(&self, location: &BundleLocation) -> Result<()> {
        let settings = self
            .settings
            .settings(&location.configuration, &location.sdk)?;
        let identity = settings.get(CODE_SIGN_IDENTITY)?;
        let folder = PathBuf::from(settings.get(CODESIGNING_FOLDER_PATH)?);

        info!("Re-signing '{}' with '{identity}'", folder.display());
        self.tool.sign(identity, &folder, true)?.check()?;
        Ok(())
    }
}

fn transition(location: &BundleLocation, state: &mut SigningState, next: SigningState) {
    debug!("{location}: {state:?} -> {next:?}");
    *state = next;
}
