//! Error types for install operations.
//!
//! Every failure of [`Installer::install`](crate::Installer::install) surfaces
//! as a single [`Error`] whose source chain names the phase (download or
//! extraction) and the underlying cause. Errors are categorized so callers
//! can decide whether rerunning is worthwhile.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for install operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of install errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid caller-supplied configuration.
    Configuration,
    /// Network-related errors (transient, retryable).
    Network,
    /// Platform not supported.
    Platform,
    /// The cached archive was truncated and has been discarded.
    Corrupted,
    /// Archive is malformed or in an unsupported format.
    Format,
    /// Permission denied during installation.
    Permission,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether rerunning the install is likely to succeed.
    ///
    /// Corrupted archives are purged before the error is returned, so the
    /// next attempt downloads a fresh copy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Corrupted)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Invalid configuration",
            Self::Network => "Network connectivity issue",
            Self::Platform => "Unsupported platform",
            Self::Corrupted => "Corrupted download",
            Self::Format => "Invalid archive format",
            Self::Permission => "Permission denied",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Configuration => "Check the requested version and download root",
            Self::Network => "Check your internet connection, proxy and credentials, then try again",
            Self::Platform => "This tool may not be available for your platform",
            Self::Corrupted => "The cached archive was removed, run the install again",
            Self::Format => "Verify the download root serves the expected archive",
            Self::Permission => "Check directory permissions or run with appropriate access",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// The single error kind returned by an install.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller-supplied configuration is invalid (e.g. version without `v`).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Failed to detect the current platform.
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// Operating system.
        os: String,
        /// CPU architecture.
        arch: String,
    },

    /// The archive could not be downloaded.
    #[error("could not download {tool}")]
    Download {
        /// Tool being installed.
        tool: String,
        /// What went wrong.
        #[source]
        source: DownloadError,
    },

    /// The archive could not be extracted or normalized.
    #[error("could not extract the {tool} archive")]
    Extraction {
        /// Tool being installed.
        tool: String,
        /// What went wrong.
        #[source]
        source: ExtractError,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration(_) => ErrorCategory::Configuration,
            Error::UnsupportedPlatform { .. } => ErrorCategory::Platform,
            Error::Download { source, .. } => match source {
                DownloadError::Io { source, .. } => io_category(source),
                _ => ErrorCategory::Network,
            },
            Error::Extraction { source, .. } => match source {
                ExtractError::Corrupted { .. } => ErrorCategory::Corrupted,
                ExtractError::Format { .. }
                | ExtractError::Unsupported { .. }
                | ExtractError::MissingRoot { .. } => ErrorCategory::Format,
                ExtractError::Io { source, .. } => io_category(source),
            },
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether extraction failed because the archive ended prematurely.
    #[must_use]
    pub fn is_corrupted_archive(&self) -> bool {
        matches!(
            self,
            Error::Extraction {
                source: ExtractError::Corrupted { .. },
                ..
            }
        )
    }
}

fn io_category(err: &io::Error) -> ErrorCategory {
    if err.kind() == io::ErrorKind::PermissionDenied {
        ErrorCategory::Permission
    } else {
        ErrorCategory::Other
    }
}

// =============================================================================
// Phase errors
// =============================================================================

/// Failures while fetching an archive.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Connection, TLS, or protocol failure.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The proxy settings could not be applied.
    #[error("invalid proxy configuration: {message}")]
    Proxy {
        /// Error message.
        message: String,
    },

    /// Writing the downloaded file failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    /// Map a ureq failure for `url` to a download error.
    pub fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => Self::Status {
                url: url.to_string(),
                status,
            },
            other => Self::Transport {
                url: url.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Failures while unpacking an archive or normalizing its layout.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The archive ended before its content was complete.
    #[error("archive {archive} is truncated: {source}")]
    Corrupted {
        /// Archive path.
        archive: PathBuf,
        /// Underlying end-of-file error.
        #[source]
        source: io::Error,
    },

    /// The archive content is malformed.
    #[error("archive {archive} is malformed: {message}")]
    Format {
        /// Archive path.
        archive: PathBuf,
        /// Error message.
        message: String,
    },

    /// The archive type is not recognised.
    #[error("unsupported archive type: {archive}")]
    Unsupported {
        /// Archive path.
        archive: PathBuf,
    },

    /// The expected distribution directory was not found after extraction.
    #[error("could not find distribution directory {expected}")]
    MissingRoot {
        /// Directory that was expected to exist.
        expected: PathBuf,
    },

    /// Writing extracted files failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Failures while running an external process.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("{program} exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        /// Program that was launched.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "signal".to_string(),
    }
}
