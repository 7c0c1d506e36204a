//! Project management
//!
//! Handles project initialization and provides access to the scorebook.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{Config, MatchStore, Scorebook};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a crease project. Run 'crease init' first.")]
    NotInProject,
}

/// A Crease project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let crease_dir = root.join(PROJECT_DIR);

        for dir in [
            crease_dir.clone(),
            crease_dir.join("matches"),
            crease_dir.join("backups"),
        ] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        // Create default config
        let config_path = crease_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Crease configuration

# Minutes a scorer lease lasts before anyone may take it over
lease_minutes = 15

# Overs per innings for 'crease match new' without --overs
default_overs = 20

# Keep the previous snapshot of each match in backups/
backups = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = crease_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Previous snapshots
backups/

# Per-match write locks
matches/*.lock
matches/*.tmp
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        tracing::info!(root = %root.display(), "project initialized");
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .crease directory path
    pub fn crease_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the match store, with backups if configured
    pub fn match_store(&self) -> MatchStore {
        let store = MatchStore::for_project(&self.root);
        if self.config.project.backups {
            store.with_backups(self.crease_dir().join("backups"))
        } else {
            store
        }
    }

    /// Returns the scorebook for this project
    pub fn scorebook(&self) -> Scorebook {
        Scorebook::new(self.match_store(), self.config.project.clone())
    }
}
