//! Install orchestration.
//!
//! [`Installer::install`] runs the whole sequence under the install lock of
//! the target directory:
//!
//! 1. probe the existing binary and stop if it already reports the version
//! 2. validate the requested version
//! 3. resolve the cached archive, downloading it if absent
//! 4. wipe the install directory and extract the archive into it
//! 5. normalize the extracted layout
//!
//! A truncated archive found during step 4 is deleted together with the
//! partial install directory, so the next run starts from a clean download.

use crate::config::InstallConfig;
use crate::download::{FileDownloader, HttpDownloader};
use crate::error::{Error, ExtractError, Result};
use crate::executor::ExecutorConfig;
use crate::extract::{ArchiveExtractor, DefaultArchiveExtractor};
use crate::lock;
use crate::probe::{self, ProbeResult};
use crate::proxy::ProxyConfig;
use crate::tools::{RootLayout, ToolSpec};
use crate::types::{CacheDescriptor, InstallOptions, InstallOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Installs one tool into one install root.
///
/// The installer holds configuration only; `install` may be called any
/// number of times, from any number of threads.
///
/// # Example
///
/// ```no_run
/// use toolchain::{DirectoryCache, InstallConfig, InstallOptions, Installer, ProxyConfig, Tool};
///
/// let config = InstallConfig::new("/work/.toolpin", DirectoryCache::new("/tmp/toolpin-cache"))
///     .working_dir("/work");
/// let installer = Installer::new(config, Tool::Volta.spec(), ProxyConfig::from_env());
///
/// let outcome = installer.install(&InstallOptions::new("v1.1.1")).expect("install failed");
/// println!("{outcome}");
/// ```
#[derive(Clone)]
pub struct Installer {
    config: InstallConfig,
    tool: ToolSpec,
    downloader: Arc<dyn FileDownloader>,
    extractor: Arc<dyn ArchiveExtractor>,
}

impl Installer {
    /// Create an installer that downloads over HTTP through `proxy`.
    #[must_use]
    pub fn new(config: InstallConfig, tool: ToolSpec, proxy: ProxyConfig) -> Self {
        Self {
            config,
            tool,
            downloader: Arc::new(HttpDownloader::new(proxy)),
            extractor: Arc::new(DefaultArchiveExtractor::new()),
        }
    }

    /// Replace the downloader (useful for testing).
    #[must_use]
    pub fn with_downloader(mut self, downloader: impl FileDownloader + 'static) -> Self {
        self.downloader = Arc::new(downloader);
        self
    }

    /// Replace the archive extractor.
    #[must_use]
    pub fn with_extractor(mut self, extractor: impl ArchiveExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Tool this installer handles.
    pub fn tool(&self) -> &ToolSpec {
        &self.tool
    }

    /// Directory the tool is extracted into.
    pub fn install_dir(&self) -> PathBuf {
        self.tool.install_dir(self.config.install_root())
    }

    /// Where the installed binary is expected.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig::for_install(&self.config, &self.tool)
    }

    /// Probe the binary at the expected location.
    pub fn probe(&self) -> ProbeResult {
        probe::probe_installed_version(&self.executor_config(), &self.tool.version_arg)
    }

    // =========================================================================
    // Installation
    // =========================================================================

    /// Make sure `options.version` is installed.
    pub fn install(&self, options: &InstallOptions) -> Result<InstallOutcome> {
        let install_dir = self.install_dir();
        let dir_lock = lock::install_lock(&install_dir);
        let _guard = lock::acquire(&dir_lock);

        let download_root = options
            .download_root
            .as_deref()
            .filter(|root| !root.is_empty())
            .unwrap_or(self.tool.default_download_root.as_str());

        match self.probe() {
            ProbeResult::Installed(version) if version == options.bare_version() => {
                log::info!("{} {version} is already installed.", self.tool.name);
                return Ok(InstallOutcome::AlreadyInstalled {
                    tool: self.tool.name.clone(),
                    version,
                });
            }
            ProbeResult::Installed(version) => log::info!(
                "{} {version} was installed, but we need version {}",
                self.tool.name,
                options.version
            ),
            ProbeResult::NotInstalled => {}
            ProbeResult::ProbeFailed(err) => {
                log::debug!("Treating {} as not installed: {err}", self.tool.name);
            }
        }

        validate_version(&self.tool.name, &options.version)?;
        self.install_version(options, download_root, &install_dir)
    }

    fn install_version(
        &self,
        options: &InstallOptions,
        download_root: &str,
        install_dir: &Path,
    ) -> Result<InstallOutcome> {
        let name = &self.tool.name;
        let version = &options.version;
        log::info!("Installing {name} version {version}");

        let format = self.tool.archive_format_for(self.config.target_platform());
        let url = self.tool.download_url(download_root, version, format);
        log::info!("Will download {name} here: {url}");

        let descriptor = CacheDescriptor::new(name, version, format.extension());
        let archive = self.config.cache().resolve(&descriptor);
        self.download_if_missing(&url, &archive, options)?;

        remove_stale_install(name, install_dir);
        if let Err(e) = fs::create_dir_all(install_dir) {
            log::warn!("Could not create {}: {e}", install_dir.display());
        }

        log::info!("Unpacking {} into {}", archive.display(), install_dir.display());
        if let Err(source) = self.extractor.extract(&archive, install_dir) {
            if matches!(source, ExtractError::Corrupted { .. }) {
                purge_corrupted(&archive, install_dir);
            }
            return Err(self.extraction_error(source));
        }

        normalize_layout(&self.tool.root_layout, install_dir, version)
            .map_err(|source| self.extraction_error(source))?;

        let path = self
            .tool
            .binary_path(self.config.install_root(), self.config.target_platform());
        log::info!("Installed {name} {version} locally.");
        Ok(InstallOutcome::Installed {
            tool: name.clone(),
            version: version.clone(),
            path,
        })
    }

    fn download_if_missing(&self, url: &str, archive: &Path, options: &InstallOptions) -> Result<()> {
        if archive.exists() {
            log::debug!("Using cached archive {}", archive.display());
            return Ok(());
        }
        log::info!("Downloading {url} to {}", archive.display());
        self.downloader
            .download(url, archive, options.credentials.as_ref())
            .map_err(|source| Error::Download {
                tool: self.tool.name.clone(),
                source,
            })
    }

    fn extraction_error(&self, source: ExtractError) -> Error {
        Error::Extraction {
            tool: self.tool.name.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .field("tool", &self.tool.name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Steps
// =============================================================================

/// Versions must start with `v` and stay a single path component, since they
/// are spliced into URLs and cache paths.
fn validate_version(tool: &str, version: &str) -> Result<()> {
    if !version.starts_with('v') {
        return Err(Error::configuration(format!(
            "{tool} version has to start with prefix 'v', got '{version}'"
        )));
    }
    if version.contains(['/', '\\']) {
        return Err(Error::configuration(format!(
            "{tool} version '{version}' must not contain path separators"
        )));
    }
    Ok(())
}

fn remove_stale_install(tool: &str, install_dir: &Path) {
    if install_dir.is_dir()
        && let Err(e) = fs::remove_dir_all(install_dir)
    {
        log::warn!(
            "Failed to delete existing {tool} installation at {}: {e}",
            install_dir.display()
        );
    }
}

fn purge_corrupted(archive: &Path, install_dir: &Path) {
    log::error!(
        "The archive file {} is corrupted and will be deleted. Please try the build again.",
        archive.display()
    );
    if let Err(e) = fs::remove_file(archive) {
        log::warn!("Could not delete {}: {e}", archive.display());
    }
    if install_dir.exists()
        && let Err(e) = fs::remove_dir_all(install_dir)
    {
        log::warn!("Could not delete {}: {e}", install_dir.display());
    }
}

fn normalize_layout(
    layout: &RootLayout,
    install_dir: &Path,
    version: &str,
) -> std::result::Result<(), ExtractError> {
    let (prefix, root) = match layout {
        RootLayout::AsIs => return Ok(()),
        RootLayout::VersionedRoot { prefix, root } => (prefix, root),
    };

    let root_dir = install_dir.join(root);
    if root_dir.exists() {
        return Ok(());
    }
    let versioned = install_dir.join(format!("{prefix}{version}"));
    log::debug!("{} not found, checking for {}", root_dir.display(), versioned.display());
    if !versioned.is_dir() {
        return Err(ExtractError::MissingRoot { expected: versioned });
    }
    fs::rename(&versioned, &root_dir).map_err(|source| ExtractError::Io {
        path: root_dir,
        source,
    })
}
