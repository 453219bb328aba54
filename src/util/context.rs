//! Global context for Quay operations.
//!
//! Provides centralized access to the working directory, the user's global
//! configuration location, and output settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_path, load_config, Config, CONFIG_FILE_NAME};

/// Global context containing configuration paths and output settings.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config file (~/.quay/config.toml), if a home directory exists
    global_config: Option<PathBuf>,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            global_config: global_config_path(),
            color: true,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Override the global config location.
    pub fn with_global_config(mut self, path: Option<PathBuf>) -> Self {
        self.global_config = path;
        self
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn use_color(&self) -> bool {
        self.color
    }

    /// Resolve a user-supplied project path against the working directory.
    pub fn project_root(&self, path: Option<&Path>) -> PathBuf {
        match path {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.cwd.join(p),
            None => self.find_config_root().unwrap_or_else(|| self.cwd.clone()),
        }
    }

    /// Find the nearest ancestor of the working directory containing quay.toml.
    pub fn find_config_root(&self) -> Option<PathBuf> {
        self.cwd
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
            .map(Path::to_path_buf)
    }

    /// Load the merged configuration for a project root.
    pub fn load_config(&self, project_root: &Path) -> Config {
        load_config(
            self.global_config.as_deref(),
            &project_root.join(CONFIG_FILE_NAME),
        )
    }
}
