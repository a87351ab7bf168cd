//! Stack configuration file and per-invocation settings.
//!
//! # Stack config file
//!
//! ```yaml
//! parameters:
//!   Environment: prod
//! capabilities:
//!   - CAPABILITY_IAM
//! tags:
//!   team: platform
//! ```
//!
//! Every field is optional. The settings structs are built once from parsed
//! command-line flags and then only read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ChangeSetName, ChangeSetRequest, StackName, StackRequest};

// ---------------------------------------------------------------------------
// Stack config file
// ---------------------------------------------------------------------------

/// Parameters, capabilities and tags forwarded with every stack request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl StackConfig {
    /// Load a stack config file.
    ///
    /// Returns `ConfigError::NotFound` if absent,
    /// `ConfigError::Parse` (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `load_at` when a path was given, the empty config otherwise.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_at(path),
            None => Ok(Self::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Where fragments are read from and where the merged template goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSettings {
    pub source_dir: PathBuf,
    pub output: PathBuf,
    pub overwrite: bool,
}

/// Target stack and the config forwarded with its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSettings {
    pub stack_name: StackName,
    pub config: StackConfig,
}

impl StackSettings {
    /// Build the create/update payload for `template_body`.
    pub fn request(&self, template_body: &str) -> StackRequest {
        StackRequest {
            stack_name: self.stack_name.clone(),
            template_body: template_body.to_string(),
            parameters: self.config.parameters.clone(),
            capabilities: self.config.capabilities.clone(),
            tags: self.config.tags.clone(),
        }
    }
}

/// Change-set naming and retention for `cform plan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSettings {
    pub change_set_name: ChangeSetName,
    pub keep_change_set: bool,
}

impl PlanSettings {
    pub fn request(&self, stack: &StackSettings, template_body: &str) -> ChangeSetRequest {
        ChangeSetRequest {
            change_set_name: self.change_set_name.clone(),
            stack: stack.request(template_body),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
