//! Configuration loading for prdock.
//!
//! Configuration lives in `.prdock.yaml` at the repository root, with a
//! per-user fallback at `~/.prdock.yaml`. Everything has a default, so no
//! file is required.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::plan::NamingMode;

pub const CONFIG_FILE_NAME: &str = ".prdock.yaml";

const EXAMPLE_CONFIG: &str = "\
# prdock configuration.
#
# How local branches for checked-out pull requests are named:
#   standard - the PR's head branch name; fork PRs get a pr-<number>- prefix
#   github   - fork PRs use the <owner>:<branch> display convention
branch_naming: standard
";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Default branch naming mode; overridable per invocation with
    /// `--naming`.
    #[serde(default)]
    pub branch_naming: NamingMode,
}

impl Config {
    /// Load configuration, preferring a project file in `dir` (the
    /// repository root, or the current directory when `None`) over the
    /// per-user file, over defaults.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let project = match dir {
            Some(dir) => dir.join(CONFIG_FILE_NAME),
            None => PathBuf::from(CONFIG_FILE_NAME),
        };
        if project.is_file() {
            return Self::from_file(&project);
        }

        if let Some(home) = home::home_dir() {
            let user = home.join(CONFIG_FILE_NAME);
            if user.is_file() {
                return Self::from_file(&user);
            }
        }

        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Write an example `.prdock.yaml` into the current directory.
    pub fn init() -> Result<()> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        if path.exists() {
            return Err(anyhow!("{} already exists", CONFIG_FILE_NAME));
        }
        std::fs::write(&path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
        println!("✓ Created {}", CONFIG_FILE_NAME);
        Ok(())
    }
}
