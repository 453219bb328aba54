//! Configuration file support for Quay.
//!
//! Quay reads two configuration files:
//! - Global: `~/.quay/config.toml` - User-wide defaults
//! - Project: `quay.toml` at the project root - Project-specific overrides
//!
//! Project config takes precedence over global config. Unset values fall
//! back to the built-in defaults exposed by the accessor methods.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};


/// Project configuration file name.
pub const CONFIG_FILE_NAME: &str = "quay.toml";

/// Name of the catch-all unit when none is configured.
pub const DEFAULT_UNIT_NAME: &str = "main";

/// Conventional Python dependency manifest.
pub const DEFAULT_PYTHON_MANIFEST: &str = "requirements.txt";

/// Fallback entrypoints tried, in order, when a unit has no annotated ones.
pub const DEFAULT_PYTHON_ENTRYPOINTS: &[&str] = &["main.py", "app/main.py", "app.py", "app/app.py"];

/// Capabilities that cut closure traversal at another unit's files.
pub const DEFAULT_BOUNDARIES: &[&str] = &["expose", "execution_unit"];

/// Paths never loaded into the project index.
pub const DEFAULT_IGNORES: &[&str] = &[
    "**/__pycache__/**",
    "**/*.pyc",
    ".venv/**",
    "venv/**",
    "node_modules/**",
    "target/**",
];

/// Quay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout settings
    pub project: ProjectConfig,

    /// Python front end settings
    pub python: PythonConfig,

    /// Resolver settings
    pub resolver: ResolverConfig,

    /// Pipeline settings
    pub compile: CompileConfig,
}

/// Project layout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name of the catch-all unit (empty string disables it)
    pub default_unit: Option<String>,

    /// Extra glob patterns excluded from loading
    pub ignore: Vec<String>,
}

/// Python front end settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Conventional manifest file name
    pub manifest: Option<String>,

    /// Ordered fallback entrypoint paths
    pub fallback_entrypoints: Option<Vec<String>>,
}

/// Resolver settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Upstream boundary capability names
    pub boundaries: Option<Vec<String>>,
}

/// Pipeline settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Process execution units in parallel
    pub parallel: Option<bool>,

    /// Worker threads for parallel processing (None = auto-detect)
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.project.default_unit.is_some() {
            self.project.default_unit = other.project.default_unit;
        }
        // Ignore patterns accumulate
        self.project.ignore.extend(other.project.ignore);

        if other.python.manifest.is_some() {
            self.python.manifest = other.python.manifest;
        }
        if other.python.fallback_entrypoints.is_some() {
            self.python.fallback_entrypoints = other.python.fallback_entrypoints;
        }

        if other.resolver.boundaries.is_some() {
            self.resolver.boundaries = other.resolver.boundaries;
        }

        if other.compile.parallel.is_some() {
            self.compile.parallel = other.compile.parallel;
        }
        if other.compile.jobs.is_some() {
            self.compile.jobs = other.compile.jobs;
        }
    }

    /// Name of the catch-all unit, or `None` when disabled.
    pub fn default_unit(&self) -> Option<&str> {
        match self.project.default_unit.as_deref() {
            Some("") => None,
            Some(name) => Some(name),
            None => Some(DEFAULT_UNIT_NAME),
        }
    }

    /// Built-in plus configured ignore patterns.
    pub fn ignore_patterns(&self) -> Vec<String> {
        DEFAULT_IGNORES
            .iter()
            .map(|s| s.to_string())
            .chain(self.project.ignore.iter().cloned())
            .collect()
    }

    pub fn python_manifest(&self) -> &str {
        self.python
            .manifest
            .as_deref()
            .unwrap_or(DEFAULT_PYTHON_MANIFEST)
    }

    pub fn python_fallback_entrypoints(&self) -> Vec<String> {
        match &self.python.fallback_entrypoints {
            Some(paths) => paths.clone(),
            None => DEFAULT_PYTHON_ENTRYPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Upstream boundary capabilities used by the resolver.
    pub fn boundaries(&self) -> Vec<String> {
        match &self.resolver.boundaries {
            Some(caps) => caps.clone(),
            None => DEFAULT_BOUNDARIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn parallel(&self) -> bool {
        self.compile.parallel.unwrap_or(true)
    }

    pub fn jobs(&self) -> Option<usize> {
        self.compile.jobs
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (quay.toml)
/// 2. Global config (~/.quay/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global quay config path (~/.quay/config.toml).
pub fn global_config_path() -> Option<std::path::PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".quay").join("config.toml"))
}
