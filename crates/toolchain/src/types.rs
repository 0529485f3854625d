//! Core types for tool installation.
//!
//! This module contains the value types passed into and returned from an
//! install: platform information, credentials, cache keys, install options
//! and the install outcome.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Target platform for binary downloads.
///
/// # Example
///
/// ```
/// use toolchain::Platform;
///
/// let platform = Platform::new("linux", "x86_64", "x86_64-unknown-linux-gnu");
/// assert!(platform.is_linux());
/// assert_eq!(platform.executable_extension(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system (e.g., "macos", "linux", "windows").
    pub os: String,
    /// CPU architecture (e.g., "aarch64", "x86_64").
    pub arch: String,
    /// Platform triple (e.g., "aarch64-apple-darwin").
    pub triple: String,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>, triple: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            triple: triple.into(),
        }
    }

    /// Check if this platform is macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == "macos"
    }

    /// Check if this platform is Linux.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == "linux"
    }

    /// Check if this platform is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Suffix appended to executable names on this platform.
    #[must_use]
    pub fn executable_extension(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.triple)
    }
}

/// Basic-auth credentials for the download server.
///
/// `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub username: String,
    /// Password or token.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cache lookup key for a downloaded archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheDescriptor {
    /// Tool name.
    pub name: String,
    /// Requested version, including its `v` prefix.
    pub version: String,
    /// Archive extension without a leading dot (e.g. "tar.gz").
    pub extension: String,
}

impl CacheDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            extension: extension.into(),
        }
    }

    /// File name of the archive, `<name>-<version>.<extension>`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.name, self.version, self.extension)
    }
}

/// Options for a single install call.
///
/// # Example
///
/// ```
/// use toolchain::{Credentials, InstallOptions};
///
/// let options = InstallOptions::new("v1.1.1")
///     .download_root("https://mirror.example.com/volta/")
///     .credentials(Credentials::new("ci", "secret"));
///
/// assert_eq!(options.version, "v1.1.1");
/// assert!(options.credentials.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Version to install; must start with `v`.
    pub version: String,
    /// Download root override (None or empty = the tool's default).
    pub download_root: Option<String>,
    /// Optional basic-auth credentials for the download.
    pub credentials: Option<Credentials>,
}

impl InstallOptions {
    /// Create install options for `version`.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            download_root: None,
            credentials: None,
        }
    }

    /// Override the download root.
    #[must_use]
    pub fn download_root(mut self, root: impl Into<String>) -> Self {
        self.download_root = Some(root.into());
        self
    }

    /// Authenticate downloads with these credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Requested version without its leading `v`.
    #[must_use]
    pub fn bare_version(&self) -> &str {
        self.version.strip_prefix('v').unwrap_or(&self.version)
    }
}

/// Result of an install call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallOutcome {
    /// The requested version was already present; nothing was done.
    AlreadyInstalled {
        /// Tool name.
        tool: String,
        /// Version reported by the installed binary.
        version: String,
    },
    /// The archive was downloaded (or taken from the cache) and extracted.
    Installed {
        /// Tool name.
        tool: String,
        /// Installed version, including its `v` prefix.
        version: String,
        /// Path to the installed binary.
        path: PathBuf,
    },
}

impl InstallOutcome {
    /// Whether this call performed an installation.
    #[must_use]
    pub fn was_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled { tool, version } => {
                write!(f, "{tool} {version} is already installed")
            }
            Self::Installed {
                tool,
                version,
                path,
            } => write!(f, "{tool} {version} installed at {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Platform tests
    // =========================================================================

    #[test]
    fn test_platform_predicates() {
        let platform = Platform::new("macos", "aarch64", "aarch64-apple-darwin");
        assert!(platform.is_macos());
        assert!(!platform.is_linux());
        assert!(!platform.is_windows());
        assert_eq!(platform.to_string(), "aarch64-apple-darwin");
    }

    #[test]
    fn test_platform_executable_extension() {
        let windows = Platform::new("windows", "x86_64", "x86_64-pc-windows-msvc");
        assert_eq!(windows.executable_extension(), ".exe");
        let linux = Platform::new("linux", "x86_64", "x86_64-unknown-linux-gnu");
        assert_eq!(linux.executable_extension(), "");
    }

    // =========================================================================
    // Credentials / descriptor tests
    // =========================================================================

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("ci-bot", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("ci-bot"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_cache_descriptor_file_name() {
        let descriptor = CacheDescriptor::new("volta", "v1.2.3", "tar.gz");
        assert_eq!(descriptor.file_name(), "volta-v1.2.3.tar.gz");
    }

    // =========================================================================
    // InstallOptions tests
    // =========================================================================

    #[test]
    fn test_install_options_builder() {
        let options = InstallOptions::new("v1.2.3")
            .download_root("https://mirror/")
            .credentials(Credentials::new("u", "p"));
        assert_eq!(options.version, "v1.2.3");
        assert_eq!(options.download_root.as_deref(), Some("https://mirror/"));
        assert_eq!(options.credentials, Some(Credentials::new("u", "p")));
    }

    #[test]
    fn test_install_options_bare_version() {
        assert_eq!(InstallOptions::new("v1.2.3").bare_version(), "1.2.3");
        assert_eq!(InstallOptions::new("1.2.3").bare_version(), "1.2.3");
        assert_eq!(InstallOptions::new("vv1").bare_version(), "v1");
    }

    // =========================================================================
    // InstallOutcome tests
    // =========================================================================

    #[test]
    fn test_install_outcome_display() {
        let skipped = InstallOutcome::AlreadyInstalled {
            tool: "volta".to_string(),
            version: "1.2.3".to_string(),
        };
        assert_eq!(skipped.to_string(), "volta 1.2.3 is already installed");
        assert!(!skipped.was_installed());

        let installed = InstallOutcome::Installed {
            tool: "volta".to_string(),
            version: "v1.2.3".to_string(),
            path: PathBuf::from("/opt/volta/dist/bin/volta"),
        };
        assert_eq!(
            installed.to_string(),
            "volta v1.2.3 installed at /opt/volta/dist/bin/volta"
        );
        assert!(installed.was_installed());
    }
}
