//! Tool-specific layout configuration.
//!
//! The install engine is generic; everything it needs to know about a
//! particular tool (where the binary lives inside the archive, which archive
//! format is published, how the extracted tree must be reshaped) is carried
//! by a [`ToolSpec`].
//!
//! # Supported Tools
//!
//! - [`Tool::Volta`] - the Volta JavaScript tool manager

use crate::types::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default release host for Volta archives.
pub const VOLTA_DOWNLOAD_ROOT: &str = "https://github.com/volta-cli/volta/releases/download/";

/// Archive formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball.
    TarGz,
    /// Zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Extension without a leading dot, as used in URLs and cache names.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Detect the format from an archive file name.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// How the extracted tree is reshaped after unpacking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RootLayout {
    /// The archive already has the expected layout.
    AsIs,
    /// The archive nests everything in `<prefix><version>/`, which is
    /// renamed to `<root>/` inside the install directory.
    VersionedRoot {
        /// Folder prefix preceding the version (e.g. "yarn-").
        prefix: String,
        /// Name the folder is renamed to.
        root: String,
    },
}

/// Everything the installer needs to know about one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Name used in archive file names, URLs and messages.
    pub name: String,
    /// Directory under the install root that holds the extracted archive.
    pub install_subpath: PathBuf,
    /// Binary location relative to the install directory, without any
    /// platform executable suffix.
    pub binary_subpath: PathBuf,
    /// Download root used when no override is configured.
    pub default_download_root: String,
    /// Published archive format.
    pub archive_format: ArchiveFormat,
    /// Post-extraction layout step.
    pub root_layout: RootLayout,
    /// Argument that makes the binary print its version.
    pub version_arg: String,
}

impl ToolSpec {
    /// Archive format to download for `platform`.
    ///
    /// Every platform currently gets the configured format.
    #[must_use]
    pub fn archive_format_for(&self, _platform: &Platform) -> ArchiveFormat {
        self.archive_format
    }

    /// Install directory of this tool under `install_root`.
    #[must_use]
    pub fn install_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join(&self.install_subpath)
    }

    /// Full binary path under `install_root` for `platform`.
    #[must_use]
    pub fn binary_path(&self, install_root: &Path, platform: &Platform) -> PathBuf {
        let mut path = self.install_dir(install_root).join(&self.binary_subpath);
        let ext = platform.executable_extension();
        if !ext.is_empty() {
            let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            name.push(ext);
            path.set_file_name(name);
        }
        path
    }

    /// Archive download URL: `<root><version>/<name>-<version>.<ext>`.
    #[must_use]
    pub fn download_url(&self, download_root: &str, version: &str, format: ArchiveFormat) -> String {
        format!(
            "{download_root}{version}/{}-{version}.{}",
            self.name,
            format.extension()
        )
    }
}

/// Tools with built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// The Volta JavaScript tool manager.
    Volta,
}

impl Tool {
    /// Get the tool name as a string.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Volta => "volta",
        }
    }

    /// Get all supported tools.
    #[must_use]
    pub fn all() -> &'static [Tool] {
        &[Tool::Volta]
    }

    /// Layout configuration for this tool.
    #[must_use]
    pub fn spec(&self) -> ToolSpec {
        match self {
            Self::Volta => ToolSpec {
                name: "volta".to_string(),
                install_subpath: PathBuf::from("volta"),
                binary_subpath: ["dist", "bin", "volta"].iter().collect(),
                default_download_root: VOLTA_DOWNLOAD_ROOT.to_string(),
                archive_format: ArchiveFormat::TarGz,
                root_layout: RootLayout::AsIs,
                version_arg: "--version".to_string(),
            },
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tool::all()
            .iter()
            .copied()
            .find(|tool| tool.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tool '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> Platform {
        Platform::new("linux", "x86_64", "x86_64-unknown-linux-gnu")
    }

    #[test]
    fn test_volta_spec() {
        let spec = Tool::Volta.spec();
        assert_eq!(spec.name, "volta");
        assert_eq!(spec.archive_format, ArchiveFormat::TarGz);
        assert_eq!(spec.root_layout, RootLayout::AsIs);
        assert_eq!(spec.archive_format_for(&linux()).extension(), "tar.gz");
    }

    #[test]
    fn test_download_url_shape() {
        let spec = Tool::Volta.spec();
        let url = spec.download_url(&spec.default_download_root, "v1.1.1", ArchiveFormat::TarGz);
        assert_eq!(
            url,
            "https://github.com/volta-cli/volta/releases/download/v1.1.1/volta-v1.1.1.tar.gz"
        );
    }

    #[test]
    fn test_binary_path_unix() {
        let spec = Tool::Volta.spec();
        let path = spec.binary_path(Path::new("/work/node"), &linux());
        assert_eq!(path, Path::new("/work/node/volta/dist/bin/volta"));
    }

    #[test]
    fn test_binary_path_windows_suffix() {
        let spec = Tool::Volta.spec();
        let windows = Platform::new("windows", "x86_64", "x86_64-pc-windows-msvc");
        let path = spec.binary_path(Path::new("root"), &windows);
        assert_eq!(path.file_name().unwrap(), "volta.exe");
    }

    #[test]
    fn test_archive_format_from_path() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/c/volta-v1.tar.gz")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("a.TGZ")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.zip")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.tar.xz")), None);
    }

    #[test]
    fn test_tool_from_str() {
        assert_eq!("volta".parse::<Tool>(), Ok(Tool::Volta));
        assert_eq!("Volta".parse::<Tool>(), Ok(Tool::Volta));
        assert!("yarn".parse::<Tool>().is_err());
        assert_eq!(Tool::Volta.to_string(), "volta");
    }
}
