use super::{CodesignTool, ToolOutput};
use crate::error::{Error, Result};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Provisioning profile embedded in iOS app bundles; its CMS envelope is
/// what `security cms -D` decodes.
pub const EMBEDDED_PROFILE: &str = "embedded.mobileprovision";

/// [`CodesignTool`] backed by `codesign` and `security`
#[derive(Debug, Clone)]
pub struct SystemCodesign {
    codesign: PathBuf,
    security: PathBuf,
}

impl SystemCodesign {
    pub fn with_programs(codesign: impl Into<PathBuf>, security: impl Into<PathBuf>) -> Self {
        Self {
            codesign: codesign.into(),
            security: security.into(),
        }
    }

    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput> {
        let command = std::iter::once(program.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!("Executing: {command}");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::ToolInvocation {
                tool: command.clone(),
                status: -1,
                stderr: e.to_string(),
            })?;

        Ok(ToolOutput {
            command,
            status: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

impl CodesignTool for SystemCodesign {
    fn verify(&self, bundle: &Path) -> Result<ToolOutput> {
        let args: Vec<OsString> = vec!["--verify".into(), "-v".into(), bundle.into()];
        self.run(&self.codesign, &args)
    }

    fn entitlements(&self, bundle: &Path) -> Result<ToolOutput> {
        let args: Vec<OsString> = vec![
            "-d".into(),
            "--entitlements".into(),
            ":-".into(),
            bundle.into(),
        ];
        self.run(&self.codesign, &args)
    }

    fn cms_info(&self, bundle: &Path) -> Result<ToolOutput> {
        let args: Vec<OsString> = vec![
            "cms".into(),
            "-D".into(),
            "-i".into(),
            bundle.join(EMBEDDED_PROFILE).into(),
        ];
        self.run(&self.security, &args)
    }

    fn sign(&self, identity: &str, bundle: &Path, sign_resources: bool) -> Result<ToolOutput> {
        let mut args: Vec<OsString> = vec![
            "--force".into(),
            "--sign".into(),
            identity.into(),
            "--preserve-metadata=identifier,entitlements".into(),
        ];
        if sign_resources {
            args.push("--deep".into());
        }
        args.push(bundle.into());
        self.run(&self.codesign, &args)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // `echo` stands in for both tools so the argument vectors can be checked.
    fn echo_tool() -> SystemCodesign {
        SystemCodesign::with_programs("echo", "echo")
    }

    fn stdout(output: &ToolOutput) -> String {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    #[test]
    fn test_verify_arguments() -> Result<()> {
        let output = echo_tool().verify(Path::new("/b/App.app"))?;
        assert!(output.success());
        assert_eq!(stdout(&output), "--verify -v /b/App.app");
        assert_eq!(output.command, "echo --verify -v /b/App.app");
        Ok(())
    }

    #[test]
    fn test_entitlements_arguments() -> Result<()> {
        let output = echo_tool().entitlements(Path::new("/b/App.app"))?;
        assert_eq!(stdout(&output), "-d --entitlements :- /b/App.app");
        Ok(())
    }

    #[test]
    fn test_cms_arguments() -> Result<()> {
        let output = echo_tool().cms_info(Path::new("/b/App.app"))?;
        assert_eq!(
            stdout(&output),
            "cms -D -i /b/App.app/embedded.mobileprovision"
        );
        Ok(())
    }

    #[test]
    fn test_sign_arguments() -> Result<()> {
        let tool = echo_tool();
        let with_resources = tool.sign("iPhone Distribution: ACME", Path::new("/b/App.app"), true)?;
        assert_eq!(
            stdout(&with_resources),
            "--force --sign iPhone Distribution: ACME --preserve-metadata=identifier,entitlements --deep /b/App.app"
        );

        let without = tool.sign("-", Path::new("/b/App.app"), false)?;
        assert!(!stdout(&without).contains("--deep"));
        Ok(())
    }

    #[test]
    fn test_missing_program_is_tool_invocation_error() {
        let tool = SystemCodesign::with_programs("/nonexistent/codesign", "/nonexistent/security");
        assert!(matches!(
            tool.verify(Path::new("/b/App.app")),
            Err(Error::ToolInvocation { status: -1, .. })
        ));
    }

    #[test]
    fn test_non_zero_exit_is_reported_not_raised() -> Result<()> {
        let tool = SystemCodesign::with_programs("false", "false");
        let output = tool.verify(Path::new("/b/App.app"))?;
        assert!(!output.success());
        Ok(())
    }
}
