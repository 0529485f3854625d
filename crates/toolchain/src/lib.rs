//! # toolchain
//!
//! Pure Rust library for installing a pinned version of a command-line tool
//! into a project-local directory.
//!
//! This crate provides functionality for:
//! - Probing an existing install and skipping when the version already matches
//! - Downloading release archives (basic auth, proxies) into a local cache
//! - Extracting tar.gz and zip archives, purging truncated downloads
//! - Serializing concurrent installs into the same directory
//!
//! ## Example
//!
//! ```no_run
//! use toolchain::{DirectoryCache, InstallConfig, InstallOptions, Installer, ProxyConfig, Tool};
//!
//! let config = InstallConfig::new("/work/project/.toolpin", DirectoryCache::new("/tmp/toolpin"))
//!     .working_dir("/work/project");
//! let installer = Installer::new(config, Tool::Volta.spec(), ProxyConfig::from_env());
//!
//! let outcome = installer
//!     .install(&InstallOptions::new("v1.1.1"))
//!     .expect("installation failed");
//! println!("{outcome}");
//!
//! // The binary now reports the pinned version.
//! assert_eq!(installer.probe().version(), Some("1.1.1"));
//! ```
//!
//! ## Supported Tools
//!
//! | Tool  | Source                          | Archive |
//! |-------|---------------------------------|---------|
//! | Volta | github.com/volta-cli/volta      | tar.gz  |
//!
//! Other tools are described with a custom [`ToolSpec`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod download;
pub mod error;
pub mod executor;
pub mod extract;
pub mod installer;
pub mod lock;
pub mod platform;
pub mod probe;
pub mod process;
pub mod proxy;
pub mod tools;
pub mod types;

pub use cache::{CacheResolver, DirectoryCache};
pub use config::InstallConfig;
pub use download::{FileDownloader, HttpDownloader, MockDownloader};
pub use error::{DownloadError, Error, ErrorCategory, ExtractError, ProcessError, Result};
pub use executor::{ExecutorConfig, ToolExecutor};
pub use extract::{ArchiveExtractor, DefaultArchiveExtractor};
pub use installer::Installer;
pub use probe::ProbeResult;
pub use process::ProcessExecutor;
pub use proxy::{ProxyConfig, ProxySettings};
pub use tools::{ArchiveFormat, RootLayout, Tool, ToolSpec};
pub use types::{CacheDescriptor, Credentials, InstallOptions, InstallOutcome, Platform};
