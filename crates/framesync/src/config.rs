//! File-level configuration combining tracking, classification and capture.

use crate::digits::ClassifierConfig;
use crate::profile::{CaptureProfile, DOLPHIN_643X528};
use crate::result::SyncResult;
use crate::tracker::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which capture profile to use: a built-in by name, or an inline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSelection {
    /// Name of a built-in profile
    Builtin(String),
    /// Full profile definition
    Custom(CaptureProfile),
}

impl Default for ProfileSelection {
    fn default() -> Self {
        Self::Builtin(DOLPHIN_643X528.to_string())
    }
}

impl ProfileSelection {
    /// Resolve to a validated profile
    pub fn resolve(&self) -> SyncResult<CaptureProfile> {
        match self {
            Self::Builtin(name) => CaptureProfile::resolve(name),
            Self::Custom(profile) => {
                profile.validate()?;
                Ok(profile.clone())
            }
        }
    }
}

/// Everything a run needs, as stored in a YAML file.
///
/// ```yaml
/// sync:
///   start_seconds: 480
///   sentinel: "075999"
///   max_jump: 30
/// classifier:
///   min_confidence: 0.4
/// profile: dolphin-643x528
/// assets: ./times
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramesyncConfig {
    /// Tracker settings
    pub sync: SyncConfig,
    /// Classifier settings
    pub classifier: ClassifierConfig,
    /// Capture profile
    pub profile: ProfileSelection,
    /// Directory holding the digit glyph images
    pub assets: Option<std::path::PathBuf>,
}

impl FramesyncConfig {
    /// Parse from YAML text and validate
    pub fn from_yaml_str(yaml: &str) -> SyncResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file and validate
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> SyncResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> SyncResult<()> {
        self.sync.validate()?;
        self.classifier.validate()?;
        self.profile.resolve().map(|_| ())
    }
}
