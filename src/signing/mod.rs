//! # Signature Inspection
//!
//! Reads the signing metadata of an app bundle through the platform tools and
//! compares it across a re-sign. A [`SignatureSnapshot`] holds the entitlements
//! and the CMS message of a bundle at one point in time; two snapshots of the
//! same bundle taken before and after re-signing must be equal even though the
//! signature bytes themselves change.
//!
//! The tools sit behind [`CodesignTool`] so the checks run without a real
//! keychain; [`codesign::SystemCodesign`] is the implementation that shells out.

use crate::error::{Error, Result};
use log::debug;
use std::path::Path;

pub mod codesign;

/// Captured result of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Command line that produced this output, for error messages
    pub command: String,
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// Turn a non-zero exit into [`Error::ToolInvocation`]
    pub fn check(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::ToolInvocation {
                tool: self.command.clone(),
                status: self.status,
                stderr: self.stderr_lossy(),
            })
        }
    }
}

/// Platform signing and signature inspection tools
pub trait CodesignTool {
    /// Check the bundle's current signature
    fn verify(&self, bundle: &Path) -> Result<ToolOutput>;

    /// Dump the entitlements embedded in the bundle's signature
    fn entitlements(&self, bundle: &Path) -> Result<ToolOutput>;

    /// Decode the CMS message carrying the bundle's signing certificates
    fn cms_info(&self, bundle: &Path) -> Result<ToolOutput>;

    /// Re-sign the bundle in place
    fn sign(&self, identity: &str, bundle: &Path, sign_resources: bool) -> Result<ToolOutput>;
}

/// Signing metadata of a bundle at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSnapshot {
    /// `None` when the signature carries no entitlements
    pub entitlements: Option<Vec<u8>>,
    pub cms: Vec<u8>,
}

pub struct SignatureInspector<'a> {
    tool: &'a dyn CodesignTool,
}

impl<'a> SignatureInspector<'a> {
    pub fn new(tool: &'a dyn CodesignTool) -> Self {
        Self { tool }
    }

    /// Capture the bundle's entitlements and CMS message. Read-only.
    pub fn capture(&self, bundle: &Path) -> Result<SignatureSnapshot> {
        let entitlements = self.tool.entitlements(bundle)?;
        let entitlements = if entitlements.success() {
            if entitlements.stdout.iter().all(u8::is_ascii_whitespace) {
                None
            } else {
                Some(entitlements.stdout)
            }
        } else if reports_no_entitlements(&entitlements) {
            None
        } else {
            return Err(Error::Inspection {
                bundle: bundle.to_path_buf(),
                reason: format!(
                    "'{}' exited with {}: {}",
                    entitlements.command,
                    entitlements.status,
                    entitlements.stderr_lossy()
                ),
            });
        };

        let cms = self.tool.cms_info(bundle)?;
        if !cms.success() {
            return Err(Error::Inspection {
                bundle: bundle.to_path_buf(),
                reason: format!(
                    "'{}' exited with {}: {}",
                    cms.command,
                    cms.status,
                    cms.stderr_lossy()
                ),
            });
        }

        debug!(
            "Captured signature snapshot of '{}' (entitlements: {}, cms: {} bytes)",
            bundle.display(),
            entitlements.as_ref().map_or(0, Vec::len),
            cms.stdout.len()
        );

        Ok(SignatureSnapshot {
            entitlements,
            cms: cms.stdout,
        })
    }

    /// Fails with [`Error::SignatureInvalid`] unless the bundle's signature verifies
    pub fn verify_signature_valid(&self, bundle: &Path) -> Result<()> {
        let output = self.tool.verify(bundle)?;
        if output.success() {
            debug!("Signature of '{}' is valid", bundle.display());
            Ok(())
        } else {
            Err(Error::SignatureInvalid {
                bundle: bundle.to_path_buf(),
                detail: output.stderr_lossy(),
            })
        }
    }
}

fn reports_no_entitlements(output: &ToolOutput) -> bool {
    output.stderr_lossy().to_lowercase().contains("no entitlements")
}

/// Fails with [`Error::SignatureDrift`] when `before` and `after` differ in
/// entitlements or CMS content.
pub fn verify_equivalent(
    bundle: &Path,
    before: &SignatureSnapshot,
    after: &SignatureSnapshot,
) -> Result<()> {
    if before.entitlements != after.entitlements {
        return Err(Error::SignatureDrift {
            bundle: bundle.to_path_buf(),
            aspect: "entitlements".to_string(),
        });
    }
    if before.cms != after.cms {
        return Err(Error::SignatureDrift {
            bundle: bundle.to_path_buf(),
            aspect: "CMS message".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::MockCodesign;
    use std::path::PathBuf;

    fn output(status: i32, stdout: &str, stderr: &str) -> ToolOutput {
        ToolOutput {
            command: "codesign".to_string(),
            status,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_snapshot_reflexive() -> Result<()> {
        let bundle = PathBuf::from("/build/Release-iphoneos/App.app");
        let tool = MockCodesign::new();
        tool.install(&bundle, Some("<dict>get-task-allow</dict>"), "iPhone Developer: CI");
        let inspector = SignatureInspector::new(&tool);

        let first = inspector.capture(&bundle)?;
        let second = inspector.capture(&bundle)?;

        verify_equivalent(&bundle, &first, &second)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_missing_entitlements_is_a_valid_snapshot() -> Result<()> {
        let bundle = PathBuf::from("/build/App.app");
        let tool = MockCodesign::new();
        tool.install(&bundle, None, "iPhone Developer: CI");

        let snapshot = SignatureInspector::new(&tool).capture(&bundle)?;

        assert_eq!(snapshot.entitlements, None);
        assert!(!snapshot.cms.is_empty());
        Ok(())
    }

    #[test]
    fn test_unknown_bundle_fails_inspection() {
        let tool = MockCodesign::new();
        let result = SignatureInspector::new(&tool).capture(Path::new("/nowhere/App.app"));
        assert!(matches!(result, Err(Error::Inspection { .. })));
    }

    #[test]
    fn test_verify_signature_invalid() {
        let bundle = PathBuf::from("/build/App.app");
        let tool = MockCodesign::new();
        tool.install(&bundle, None, "iPhone Developer: CI");
        tool.break_signature(&bundle);

        let result = SignatureInspector::new(&tool).verify_signature_valid(&bundle);

        assert!(matches!(result, Err(Error::SignatureInvalid { .. })));
    }

    #[test]
    fn test_drift_detection() {
        let bundle = Path::new("/build/App.app");
        let before = SignatureSnapshot {
            entitlements: Some(b"a".to_vec()),
            cms: b"cms".to_vec(),
        };

        let changed_entitlements = SignatureSnapshot {
            entitlements: Some(b"b".to_vec()),
            ..before.clone()
        };
        let dropped_entitlements = SignatureSnapshot {
            entitlements: None,
            ..before.clone()
        };
        let changed_cms = SignatureSnapshot {
            cms: b"other".to_vec(),
            ..before.clone()
        };

        assert!(matches!(
            verify_equivalent(bundle, &before, &changed_entitlements),
            Err(Error::SignatureDrift { ref aspect, .. }) if aspect == "entitlements"
        ));
        assert!(matches!(
            verify_equivalent(bundle, &before, &dropped_entitlements),
            Err(Error::SignatureDrift { .. })
        ));
        assert!(matches!(
            verify_equivalent(bundle, &before, &changed_cms),
            Err(Error::SignatureDrift { ref aspect, .. }) if aspect == "CMS message"
        ));
    }

    #[test]
    fn test_tool_output_check() {
        assert!(output(0, "", "").check().is_ok());
        match output(1, "", "errSecInternalComponent\n").check() {
            Err(Error::ToolInvocation { status, stderr, .. }) => {
                assert_eq!(status, 1);
                assert_eq!(stderr, "errSecInternalComponent");
            }
            other => panic!("Expected ToolInvocation, got {other:?}"),
        }
    }

    #[test]
    fn test_no_entitlements_message_detected() {
        assert!(reports_no_entitlements(&output(
            1,
            "",
            "App.app: no entitlements\n"
        )));
        assert!(!reports_no_entitlements(&output(1, "", "code object is not signed at all")));
    }
}
