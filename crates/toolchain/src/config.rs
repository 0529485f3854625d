//! Install configuration.

use crate::cache::CacheResolver;
use crate::platform;
use crate::types::Platform;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable environment of an install: where tools go, where processes run,
/// which platform to target, and where archives are cached.
///
/// # Example
///
/// ```
/// use toolchain::{DirectoryCache, InstallConfig};
///
/// let config = InstallConfig::new("/work/project/.toolpin", DirectoryCache::new("/tmp/cache"))
///     .working_dir("/work/project");
/// assert_eq!(config.working_directory().to_str(), Some("/work/project"));
/// ```
#[derive(Clone)]
pub struct InstallConfig {
    install_root: PathBuf,
    working_dir: PathBuf,
    platform: Platform,
    cache: Arc<dyn CacheResolver>,
}

impl InstallConfig {
    /// Create a configuration for the host platform, running processes in the
    /// current directory.
    pub fn new(install_root: impl Into<PathBuf>, cache: impl CacheResolver + 'static) -> Self {
        Self::with_shared_cache(install_root, Arc::new(cache))
    }

    /// Like [`InstallConfig::new`] with a cache shared with other configs.
    pub fn with_shared_cache(install_root: impl Into<PathBuf>, cache: Arc<dyn CacheResolver>) -> Self {
        Self {
            install_root: install_root.into(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            platform: platform::current(),
            cache,
        }
    }

    /// Directory child processes run in.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Target platform.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Base directory under which tools are installed.
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Directory child processes run in.
    pub fn working_directory(&self) -> &Path {
        &self.working_dir
    }

    /// Target platform.
    pub fn target_platform(&self) -> &Platform {
        &self.platform
    }

    /// Archive cache.
    pub fn cache(&self) -> &dyn CacheResolver {
        self.cache.as_ref()
    }
}

impl fmt::Debug for InstallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallConfig")
            .field("install_root", &self.install_root)
            .field("working_dir", &self.working_dir)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
