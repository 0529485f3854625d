//! HTTP(S) downloader backed by ureq.

use super::FileDownloader;
use crate::error::DownloadError;
use crate::proxy::ProxyConfig;
use crate::types::Credentials;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("toolpin/", env!("CARGO_PKG_VERSION"));

/// Whole-request timeout, generous enough for large archives.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const CHUNK_SIZE: usize = 64 * 1024;

/// Downloads archives over HTTP(S).
///
/// The body is streamed into a temporary file next to the destination and
/// renamed into place once complete, so an interrupted transfer never leaves
/// a partial archive where the cache expects a finished one.
///
/// # Example
///
/// ```no_run
/// use toolchain::download::{FileDownloader, HttpDownloader};
/// use toolchain::ProxyConfig;
/// use std::path::Path;
///
/// let downloader = HttpDownloader::new(ProxyConfig::from_env());
/// downloader
///     .download(
///         "https://github.com/volta-cli/volta/releases/download/v1.1.1/volta-v1.1.1.tar.gz",
///         Path::new("/tmp/volta-v1.1.1.tar.gz"),
///         None,
///     )
///     .expect("download failed");
/// ```
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    proxy: ProxyConfig,
    timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader routing requests through `proxy`.
    #[must_use]
    pub fn new(proxy: ProxyConfig) -> Self {
        Self {
            proxy,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the whole-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build an agent for `url`, with the proxy selected for its host.
    fn agent_for(&self, url: &str) -> Result<ureq::Agent, DownloadError> {
        let proxy = match self.proxy.proxy_for_url(url) {
            Some(settings) => {
                log::info!(
                    "Using proxy {} ({}:{}) for {url}",
                    settings.id,
                    settings.host,
                    settings.port
                );
                let proxy = ureq::Proxy::new(&settings.to_url()).map_err(|e| DownloadError::Proxy {
                    message: format!("{}: {e}", settings.id),
                })?;
                Some(proxy)
            }
            None => None,
        };

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .proxy(proxy)
            .build();
        Ok(ureq::Agent::new_with_config(config))
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(ProxyConfig::none())
    }
}

impl FileDownloader for HttpDownloader {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        credentials: Option<&Credentials>,
    ) -> Result<(), DownloadError> {
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(|source| DownloadError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

        let agent = self.agent_for(url)?;
        let mut request = agent.get(url).header("User-Agent", USER_AGENT);
        if let Some(creds) = credentials {
            log::debug!("Authenticating download as {}", creds.username);
            request = request.header("Authorization", basic_auth(creds));
        }

        let mut response = request
            .call()
            .map_err(|e| DownloadError::from_ureq(url, e))?;

        let mut temp = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(parent)
            .map_err(|source| DownloadError::Io {
                path: parent.to_path_buf(),
                source,
            })?;

        let mut body = response.body_mut().as_reader();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = body.read(&mut buf).map_err(|e| DownloadError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            if n == 0 {
                break;
            }
            temp.write_all(&buf[..n]).map_err(|source| DownloadError::Io {
                path: temp.path().to_path_buf(),
                source,
            })?;
            total += n as u64;
        }

        temp.as_file().sync_all().map_err(|source| DownloadError::Io {
            path: temp.path().to_path_buf(),
            source,
        })?;
        temp.persist(destination).map_err(|e| DownloadError::Io {
            path: destination.to_path_buf(),
            source: e.error,
        })?;

        log::debug!("Downloaded {total} bytes from {url}");
        Ok(())
    }
}

fn basic_auth(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.username, credentials.password);
    format!("Basic {}", BASE64.encode(raw))
}
