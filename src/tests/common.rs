use crate::bundle::settings::{
    BuildSettings, BuildSettingsSource, CODE_SIGN_IDENTITY, CODESIGNING_FOLDER_PATH, PRODUCT_NAME,
};
use crate::error::{Error, Result};
use crate::provenance::ProjectIdentity;
use crate::resolver::{ArtifactRepository, SideArtifact};
use crate::signing::{CodesignTool, ToolOutput};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Entitlements file a mock re-sign embeds, when present in the bundle
pub const ENTITLEMENTS_FILE: &str = "archived-expanded-entitlements.xcent";

enum Lookup {
    Found(PathBuf),
    Error(String),
}

pub struct MockRepository {
    name: String,
    artifacts: HashMap<String, Lookup>,
}

impl MockRepository {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            artifacts: HashMap::new(),
        }
    }

    pub fn add_found(&mut self, artifact: &ProjectIdentity, path: impl Into<PathBuf>) {
        self.artifacts
            .insert(artifact.to_string(), Lookup::Found(path.into()));
    }

    pub fn add_error(&mut self, artifact: &ProjectIdentity, message: &str) {
        self.artifacts
            .insert(artifact.to_string(), Lookup::Error(message.to_string()));
    }
}

impl ArtifactRepository for MockRepository {
    fn id(&self) -> String {
        format!("mock://{}", self.name)
    }

    fn resolve_side_artifact(
        &self,
        artifact: &ProjectIdentity,
        _classifier: &str,
        _extension: &str,
    ) -> Result<SideArtifact> {
        match self.artifacts.get(&artifact.to_string()) {
            Some(Lookup::Found(path)) => Ok(SideArtifact::Found(path.clone())),
            Some(Lookup::Error(message)) => Err(Error::ProvenanceResolution {
                artifact: artifact.to_string(),
                reason: message.clone(),
            }),
            None => Ok(SideArtifact::NotFound),
        }
    }
}

struct SignedBundle {
    entitlements: Option<String>,
    identity: String,
    seq: u32,
    valid: bool,
}

/// In-memory stand-in for codesign and security.
///
/// Re-signing picks up `archived-expanded-entitlements.xcent` from the bundle
/// directory when it exists, so tests can tamper with entitlements on disk.
pub struct MockCodesign {
    bundles: Mutex<HashMap<PathBuf, SignedBundle>>,
    sign_calls: Mutex<Vec<PathBuf>>,
}

impl MockCodesign {
    pub fn new() -> Self {
        Self {
            bundles: Mutex::new(HashMap::new()),
            sign_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn install(&self, bundle: &Path, entitlements: Option<&str>, identity: &str) {
        self.bundles.lock().unwrap().insert(
            bundle.to_path_buf(),
            SignedBundle {
                entitlements: entitlements.map(str::to_string),
                identity: identity.to_string(),
                seq: 1,
                valid: true,
            },
        );
    }

    pub fn break_signature(&self, bundle: &Path) {
        if let Some(signed) = self.bundles.lock().unwrap().get_mut(bundle) {
            signed.valid = false;
        }
    }

    /// Number of times the bundle has been signed, including the install
    pub fn signature_seq(&self, bundle: &Path) -> Option<u32> {
        self.bundles.lock().unwrap().get(bundle).map(|s| s.seq)
    }

    pub fn sign_calls(&self) -> Vec<PathBuf> {
        self.sign_calls.lock().unwrap().clone()
    }

    fn respond<F>(&self, command: &str, bundle: &Path, f: F) -> ToolOutput
    where
        F: FnOnce(&SignedBundle) -> (i32, Vec<u8>, Vec<u8>),
    {
        let bundles = self.bundles.lock().unwrap();
        let (status, stdout, stderr) = match bundles.get(bundle) {
            Some(signed) => f(signed),
            None => (
                1,
                Vec::new(),
                format!("{}: No such file or directory", bundle.display()).into_bytes(),
            ),
        };
        ToolOutput {
            command: command.to_string(),
            status,
            stdout,
            stderr,
        }
    }
}

impl CodesignTool for MockCodesign {
    fn verify(&self, bundle: &Path) -> Result<ToolOutput> {
        Ok(self.respond("codesign --verify", bundle, |signed| {
            if signed.valid {
                (0, Vec::new(), b"valid on disk".to_vec())
            } else {
                (1, Vec::new(), b"invalid signature (code or signature have been modified)".to_vec())
            }
        }))
    }

    fn entitlements(&self, bundle: &Path) -> Result<ToolOutput> {
        Ok(self.respond("codesign -d --entitlements", bundle, |signed| {
            match &signed.entitlements {
                Some(entitlements) => (0, entitlements.clone().into_bytes(), Vec::new()),
                None => (0, Vec::new(), Vec::new()),
            }
        }))
    }

    fn cms_info(&self, bundle: &Path) -> Result<ToolOutput> {
        Ok(self.respond("security cms -D", bundle, |signed| {
            (0, format!("identity={}", signed.identity).into_bytes(), Vec::new())
        }))
    }

    fn sign(&self, identity: &str, bundle: &Path, _sign_resources: bool) -> Result<ToolOutput> {
        self.sign_calls.lock().unwrap().push(bundle.to_path_buf());

        let on_disk = std::fs::read_to_string(bundle.join(ENTITLEMENTS_FILE)).ok();
        let mut bundles = self.bundles.lock().unwrap();
        let Some(signed) = bundles.get_mut(bundle) else {
            return Ok(ToolOutput {
                command: "codesign --sign".to_string(),
                status: 1,
                stdout: Vec::new(),
                stderr: format!("{}: No such file or directory", bundle.display()).into_bytes(),
            });
        };

        if on_disk.is_some() {
            signed.entitlements = on_disk;
        }
        signed.identity = identity.to_string();
        signed.seq += 1;
        signed.valid = true;

        Ok(ToolOutput {
            command: "codesign --sign".to_string(),
            status: 0,
            stdout: Vec::new(),
            stderr: format!("{}: replacing existing signature", bundle.display()).into_bytes(),
        })
    }
}

/// Fixed build settings per (configuration, sdk)
pub struct MockBuildSettings {
    settings: HashMap<(String, String), BuildSettings>,
}

impl MockBuildSettings {
    pub fn new() -> Self {
        Self {
            settings: HashMap::new(),
        }
    }

    /// Register an app bundle at `bundle`, signed with `identity`
    pub fn add_bundle(
        &mut self,
        configuration: &str,
        sdk: &str,
        product_name: &str,
        bundle: &Path,
        identity: &str,
    ) {
        self.settings.insert(
            (configuration.to_string(), sdk.to_string()),
            BuildSettings::from_pairs([
                (PRODUCT_NAME, product_name.to_string()),
                (CODESIGNING_FOLDER_PATH, bundle.display().to_string()),
                (CODE_SIGN_IDENTITY, identity.to_string()),
            ]),
        );
    }
}

impl BuildSettingsSource for MockBuildSettings {
    fn settings(&self, configuration: &str, sdk: &str) -> Result<BuildSettings> {
        self.settings
            .get(&(configuration.to_string(), sdk.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::BuildSettings(format!("No build settings for {configuration}-{sdk}"))
            })
    }
}
