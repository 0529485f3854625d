//! Archive download.
//!
//! This module provides the [`FileDownloader`] trait, the production
//! [`HttpDownloader`], and [`MockDownloader`] for tests that must not touch
//! the network.
//!
//! # Testing
//!
//! ```
//! use toolchain::download::{FileDownloader, MockDownloader};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let dest = dir.path().join("volta-v1.0.0.tar.gz");
//!
//! let mock = MockDownloader::new();
//! mock.add_file("https://example.com/v1.0.0/volta-v1.0.0.tar.gz", b"archive".to_vec());
//! mock.download("https://example.com/v1.0.0/volta-v1.0.0.tar.gz", &dest, None).unwrap();
//!
//! assert_eq!(std::fs::read(&dest).unwrap(), b"archive");
//! assert_eq!(mock.download_count(), 1);
//! ```

mod http;

pub use http::HttpDownloader;

use crate::error::DownloadError;
use crate::types::Credentials;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Fetches a URL into a local file.
///
/// On failure nothing is left at `destination`.
pub trait FileDownloader: Send + Sync {
    /// Download `url` to `destination`, creating parent directories.
    fn download(
        &self,
        url: &str,
        destination: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<(), DownloadError>;
}

/// A request recorded by [`MockDownloader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDownload {
    /// Requested URL.
    pub url: String,
    /// User name sent with the request, if any.
    pub username: Option<String>,
}

/// In-memory downloader for tests.
///
/// Serves registered bytes by URL and answers 404 for anything else. Every
/// call is recorded, successful or not.
#[derive(Debug, Clone, Default)]
pub struct MockDownloader {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requests: Arc<Mutex<Vec<RecordedDownload>>>,
}

impl MockDownloader {
    /// Create a new empty mock downloader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` for `url`.
    pub fn add_file(&self, url: impl Into<String>, data: Vec<u8>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), data);
    }

    /// Number of download calls made so far.
    #[must_use]
    pub fn download_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// All download calls made so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedDownload> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl FileDownloader for MockDownloader {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<(), DownloadError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedDownload {
                url: url.to_string(),
                username: credentials.map(|c| c.username.clone()),
            });

        let data = self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::Status {
                url: url.to_string(),
                status: 404,
            })?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| DownloadError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(destination, data).map_err(|source| DownloadError::Io {
            path: destination.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_serves_registered_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested/archive.tar.gz");
        let mock = MockDownloader::new();
        mock.add_file("https://h/a", vec![1, 2, 3]);

        mock.download("https://h/a", &dest, Some(&Credentials::new("ci", "pw")))
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            mock.requests(),
            vec![RecordedDownload {
                url: "https://h/a".to_string(),
                username: Some("ci".to_string()),
            }]
        );
    }

    #[test]
    fn test_mock_unknown_url_is_404_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("archive.tar.gz");
        let mock = MockDownloader::new();

        let err = mock.download("https://h/missing", &dest, None).unwrap_err();

        assert!(matches!(err, DownloadError::Status { status: 404, .. }));
        assert!(!dest.exists());
        assert_eq!(mock.download_count(), 1);
    }

    #[test]
    fn test_mock_clones_share_state() {
        let mock = MockDownloader::new();
        let clone = mock.clone();
        clone.add_file("https://h/a", vec![]);
        let dir = TempDir::new().unwrap();
        mock.download("https://h/a", &dir.path().join("a"), None).unwrap();
        assert_eq!(clone.download_count(), 1);
    }
}
