//! Local archive cache.
//!
//! Downloaded archives are stored independently of the install directory so
//! a reinstall (or a corrupted extraction followed by a rerun) does not always
//! hit the network.

use crate::types::CacheDescriptor;
use std::path::{Path, PathBuf};

/// Maps a cache key to the local file that stores the archive.
///
/// Implementations must be deterministic: the same descriptor always yields
/// the same path.
pub trait CacheResolver: Send + Sync {
    /// Path where the archive for `descriptor` is (or would be) stored.
    fn resolve(&self, descriptor: &CacheDescriptor) -> PathBuf;
}

/// Cache rooted at a directory, laid out as
/// `<root>/<name>/<version>/<name>-<version>.<extension>`.
///
/// # Example
///
/// ```
/// use toolchain::{CacheDescriptor, CacheResolver, DirectoryCache};
/// use std::path::Path;
///
/// let cache = DirectoryCache::new("/var/cache/toolpin");
/// let path = cache.resolve(&CacheDescriptor::new("volta", "v1.1.1", "tar.gz"));
/// assert_eq!(
///     path,
///     Path::new("/var/cache/toolpin/volta/v1.1.1/volta-v1.1.1.tar.gz")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    root: PathBuf,
}

impl DirectoryCache {
    /// Create a cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CacheResolver for DirectoryCache {
    fn resolve(&self, descriptor: &CacheDescriptor) -> PathBuf {
        self.root
            .join(&descriptor.name)
            .join(&descriptor.version)
            .join(descriptor.file_name())
    }
}
