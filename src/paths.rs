//! Default locations for toolpin.
//!
//! # Environment Variables
//!
//! - `TOOLPIN_CACHE_DIR` - Override the archive cache directory
//!
//! # Path Resolution Priority
//!
//! For cache_dir():
//! 1. `TOOLPIN_CACHE_DIR` environment variable
//! 2. `XDG_CACHE_HOME/toolpin` (if set)
//! 3. Platform cache directory + `toolpin`
//!
//! The install root defaults to `<working dir>/.toolpin`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for cache directory override
pub const ENV_CACHE_DIR: &str = "TOOLPIN_CACHE_DIR";

/// Settings file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "toolpin.toml";

/// Install root directory name under the working directory
pub const INSTALL_DIR_NAME: &str = ".toolpin";

/// Get the archive cache directory
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CACHE_DIR)
        && !dir.is_empty()
    {
        let path = expand(&dir);
        log::debug!("Using cache dir from {}: {}", ENV_CACHE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME")
        && !xdg_cache.is_empty()
    {
        let path = PathBuf::from(xdg_cache).join("toolpin");
        log::debug!("Using XDG_CACHE_HOME: {}", path.display());
        return Ok(path);
    }

    let path = dirs::cache_dir()
        .context("Could not determine cache directory")?
        .join("toolpin");
    log::debug!("Using default cache dir: {}", path.display());
    Ok(path)
}

/// Default install root for a working directory.
pub fn default_install_root(working_dir: &Path) -> PathBuf {
    working_dir.join(INSTALL_DIR_NAME)
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
