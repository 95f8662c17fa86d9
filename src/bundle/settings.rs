use crate::error::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

pub const CODE_SIGN_IDENTITY: &str = "CODE_SIGN_IDENTITY";
pub const CODESIGNING_FOLDER_PATH: &str = "CODESIGNING_FOLDER_PATH";
pub const PRODUCT_NAME: &str = "PRODUCT_NAME";

/// Effective build settings of one (configuration, sdk) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSettings {
    values: HashMap<String, String>,
}

impl BuildSettings {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse the `KEY = value` listing printed by `xcodebuild -showBuildSettings`
    pub fn parse(output: &str) -> Self {
        let values = output
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let (key, value) = line.split_once(" =")?;
                let key = key.trim();
                if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { values }
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Result<&str> {
        match self.values.get(key).map(String::as_str) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::BuildSettings(format!(
                "Build setting '{key}' is not defined"
            ))),
        }
    }
}

/// Source of effective build settings
pub trait BuildSettingsSource {
    fn settings(&self, configuration: &str, sdk: &str) -> Result<BuildSettings>;
}

/// Reads settings from `xcodebuild -showBuildSettings` run in the working copy.
/// Results are cached per (configuration, sdk).
pub struct XcodebuildSettings {
    program: PathBuf,
    project_dir: PathBuf,
    cache: Mutex<HashMap<(String, String), BuildSettings>>,
}

impl XcodebuildSettings {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self::with_program("xcodebuild", project_dir)
    }

    pub fn with_program(program: impl Into<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            project_dir: project_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn query(&self, configuration: &str, sdk: &str) -> Result<BuildSettings> {
        let command = format!(
            "{} -configuration {configuration} -sdk {sdk} -showBuildSettings",
            self.program.display()
        );
        debug!("Executing: {command} (in {})", self.project_dir.display());

        let output = Command::new(&self.program)
            .args(["-configuration", configuration, "-sdk", sdk, "-showBuildSettings"])
            .current_dir(&self.project_dir)
            .output()
            .map_err(|e| Error::ToolInvocation {
                tool: command.clone(),
                status: -1,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::ToolInvocation {
                tool: command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(BuildSettings::parse(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl BuildSettingsSource for XcodebuildSettings {
    fn settings(&self, configuration: &str, sdk: &str) -> Result<BuildSettings> {
        let key = (configuration.to_string(), sdk.to_string());
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| Error::BuildSettings("build settings cache poisoned".to_string()))?;

        if let Some(settings) = cache.get(&key) {
            return Ok(settings.clone());
        }

        let settings = self.query(configuration, sdk)?;
        cache.insert(key, settings.clone());
        Ok(settings)
    }
}
