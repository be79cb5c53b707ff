//! Configuration types (ramfuzz.toml format).

use ramfuzz_harness::{EligibilityPolicy, HarnessOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{BuildError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RamfuzzConfig {
    /// Project metadata.
    pub project: ProjectConfig,

    /// Shape of the generated code.
    #[serde(default)]
    pub harness: HarnessConfig,

    /// Which files to analyze and where their includes live.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Project metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name.
    pub name: String,

    /// Project version (optional).
    #[serde(default)]
    pub version: Option<String>,

    /// Project root directory (default: config file directory).
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Generated code settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Namespace around every generated class.
    pub namespace: String,

    /// Prefix of generated wrapper class names.
    pub class_prefix: String,

    /// Class-level eligibility rule.
    pub eligibility: EligibilityPolicy,

    /// Standard headers included at the top of a batch run's output.
    pub preamble: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let options = HarnessOptions::default();
        Self {
            namespace: options.namespace,
            class_prefix: options.class_prefix,
            eligibility: options.eligibility,
            preamble: vec!["memory".to_string()],
        }
    }
}

/// Source file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Files to analyze, relative to the project root.
    pub files: Vec<String>,

    /// Search path for quoted includes, relative to the project root.
    pub includes: Vec<String>,

    /// Parse quoted includes so their classes are known but not harnessed.
    pub follow_includes: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            includes: Vec::new(),
            follow_includes: true,
        }
    }
}

impl RamfuzzConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// A missing `project.root` defaults to the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: RamfuzzConfig = toml::from_str(&content)?;
        if config.project.root.is_none() {
            config.project.root = path.parent().map(Path::to_path_buf);
        }
        config.validate()?;
        Ok(config)
    }

    /// A configuration with defaults for everything but the project name.
    pub fn named(name: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: name.to_string(),
                version: None,
                root: None,
            },
            harness: HarnessConfig::default(),
            sources: SourcesConfig::default(),
        }
    }

    /// Check that generated names will be valid C++.
    pub fn validate(&self) -> Result<()> {
        let segments_ok = !self.harness.namespace.is_empty()
            && self.harness.namespace.split("::").all(is_cpp_identifier);
        if !segments_ok {
            return Err(BuildError::Validation(format!(
                "harness.namespace `{}` is not a C++ namespace name",
                self.harness.namespace
            )));
        }
        if !is_cpp_identifier(&self.harness.class_prefix) {
            return Err(BuildError::Validation(format!(
                "harness.class_prefix `{}` is not a C++ identifier",
                self.harness.class_prefix
            )));
        }
        Ok(())
    }

    /// Options for the harness generator.
    pub fn harness_options(&self) -> HarnessOptions {
        HarnessOptions {
            namespace: self.harness.namespace.clone(),
            class_prefix: self.harness.class_prefix.clone(),
            eligibility: self.harness.eligibility,
        }
    }

    /// The project root, `.` if none is known.
    pub fn root(&self) -> &Path {
        self.project.root.as_deref().unwrap_or(Path::new("."))
    }

    /// Source files resolved against the project root.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.sources.files.iter().map(|f| self.root().join(f)).collect()
    }

    /// Include directories resolved against the project root.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.sources
            .includes
            .iter()
            .map(|d| self.root().join(d))
            .collect()
    }
}

fn is_cpp_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
