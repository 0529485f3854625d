//! `toolpin.toml` settings.
//!
//! ```toml
//! [install]
//! version = "v1.1.1"
//! download_root = "https://mirror.example.com/volta/"
//! install_dir = ".toolpin"
//! cache_dir = "~/.cache/toolpin"
//! skip = false
//! ```
//!
//! Every key is optional; command line flags and environment variables take
//! precedence over the file.

use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolpinConfig {
    #[serde(default)]
    pub install: InstallSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallSection {
    pub version: Option<String>,
    pub download_root: Option<String>,
    pub install_dir: Option<String>,
    pub cache_dir: Option<String>,
    pub skip: Option<bool>,
}

impl ToolpinConfig {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, `toolpin.toml` in
    /// `working_dir` is read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let path = match path {
            Some(explicit) => resolve_against(working_dir, explicit),
            None => {
                let candidate = working_dir.join(paths::CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {} in {}", paths::CONFIG_FILE_NAME, working_dir.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }
}

/// Expand `~`/`$VAR` in `path` and anchor it at `base` when relative.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    let expanded = paths::expand(&path.to_string_lossy());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}
