//! Running an installed tool binary.

use crate::config::InstallConfig;
use crate::error::ProcessError;
use crate::process::ProcessExecutor;
use crate::tools::ToolSpec;
use crate::types::Platform;
use std::collections::HashMap;
use std::path::PathBuf;

/// Where a tool binary lives and how it is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Absolute path of the tool binary.
    pub binary: PathBuf,
    /// Directory the tool runs in.
    pub working_dir: PathBuf,
    /// Platform the binary was installed for.
    pub platform: Platform,
}

impl ExecutorConfig {
    /// Binary location of `tool` inside the install root of `config`.
    #[must_use]
    pub fn for_install(config: &InstallConfig, tool: &ToolSpec) -> Self {
        Self {
            binary: tool.binary_path(config.install_root(), config.target_platform()),
            working_dir: config.working_directory().to_path_buf(),
            platform: config.target_platform().clone(),
        }
    }
}

/// Runs the tool binary with arguments; the binary's directory is put on
/// `PATH` for the child.
///
/// # Example
///
/// ```no_run
/// use toolchain::{DirectoryCache, ExecutorConfig, InstallConfig, Tool, ToolExecutor};
/// use std::collections::HashMap;
///
/// let config = InstallConfig::new("/work/.toolpin", DirectoryCache::new("/tmp/cache"));
/// let exec = ExecutorConfig::for_install(&config, &Tool::Volta.spec());
/// let code = ToolExecutor::new(&exec, ["list"], HashMap::new())
///     .execute_and_redirect_output()
///     .unwrap();
/// assert_eq!(code, 0);
/// ```
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    executor: ProcessExecutor,
}

impl ToolExecutor {
    /// Prepare `binary args...` in the configured working directory.
    pub fn new<I, S>(config: &ExecutorConfig, args: I, env: HashMap<String, String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let binary = std::path::absolute(&config.binary).unwrap_or_else(|_| config.binary.clone());
        let local_paths = binary.parent().map(|p| vec![p.to_path_buf()]).unwrap_or_default();

        let mut command = vec![binary.display().to_string()];
        command.extend(args.into_iter().map(Into::into));

        Self {
            executor: ProcessExecutor::new(&config.working_dir, local_paths, command, env),
        }
    }

    /// Run and return trimmed stdout.
    pub fn execute_and_get_result(&self) -> Result<String, ProcessError> {
        self.executor.execute_and_get_result()
    }

    /// Run with output forwarded to the log; returns the exit code.
    pub fn execute_and_redirect_output(&self) -> Result<i32, ProcessError> {
        self.executor.execute_and_redirect_output()
    }
}
