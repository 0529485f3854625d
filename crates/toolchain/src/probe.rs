//! Installed-version probe.

use crate::error::ProcessError;
use crate::executor::{ExecutorConfig, ToolExecutor};
use std::collections::HashMap;
use std::fmt;

/// What the probe found at the expected binary location.
#[derive(Debug)]
pub enum ProbeResult {
    /// The binary ran and printed this version (trimmed, without a `v`).
    Installed(String),
    /// No binary exists at the expected path.
    NotInstalled,
    /// The binary exists but could not report a version.
    ProbeFailed(ProcessError),
}

impl ProbeResult {
    /// Reported version, if the probe succeeded.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Installed(version) => Some(version),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed(version) => write!(f, "installed ({version})"),
            Self::NotInstalled => write!(f, "not installed"),
            Self::ProbeFailed(err) => write!(f, "probe failed: {err}"),
        }
    }
}

/// Run `<binary> <version_arg>` and report what was found.
///
/// Never fails: a missing binary is `NotInstalled` (nothing is spawned) and
/// any execution problem is `ProbeFailed`.
pub fn probe_installed_version(config: &ExecutorConfig, version_arg: &str) -> ProbeResult {
    if !config.binary.is_file() {
        return ProbeResult::NotInstalled;
    }
    match ToolExecutor::new(config, [version_arg], HashMap::new()).execute_and_get_result() {
        Ok(out) => {
            let version = out.trim();
            ProbeResult::Installed(version.strip_prefix('v').unwrap_or(version).to_string())
        }
        Err(err) => ProbeResult::ProbeFailed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform;
    use std::path::Path;
    use serial_test::serial;
    use tempfile::TempDir;

    fn config_for(binary: &Path, dir: &Path) -> ExecutorConfig {
        ExecutorConfig {
            binary: binary.to_path_buf(),
            working_dir: dir.to_path_buf(),
            platform: platform::current(),
        }
    }

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("tool");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_missing_binary_is_not_installed() {
        let dir = TempDir::new().unwrap();
        let result = probe_installed_version(&config_for(&dir.path().join("nope"), dir.path()), "--version");
        assert!(matches!(result, ProbeResult::NotInstalled));
        assert_eq!(result.version(), None);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_reports_trimmed_version() {
        let dir = TempDir::new().unwrap();
        let binary = script(dir.path(), "echo \"$1\" >/dev/null; echo ' 1.2.3 '");
        let result = probe_installed_version(&config_for(&binary, dir.path()), "--version");
        assert_eq!(result.version(), Some("1.2.3"));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_strips_v_prefix_from_output() {
        let dir = TempDir::new().unwrap();
        let binary = script(dir.path(), "echo v2.0.0");
        let result = probe_installed_version(&config_for(&binary, dir.path()), "--version");
        assert_eq!(result.version(), Some("2.0.0"));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_failing_binary_is_probe_failed() {
        let dir = TempDir::new().unwrap();
        let binary = script(dir.path(), "exit 1");
        let result = probe_installed_version(&config_for(&binary, dir.path()), "--version");
        assert!(matches!(result, ProbeResult::ProbeFailed(_)));
        assert!(result.to_string().starts_with("probe failed"));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_non_executable_file_is_probe_failed() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("tool");
        std::fs::write(&binary, "not a program").unwrap();
        let result = probe_installed_version(&config_for(&binary, dir.path()), "--version");
        assert!(matches!(result, ProbeResult::ProbeFailed(ProcessError::Spawn { .. })));
    }
}
