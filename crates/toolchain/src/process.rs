//! Child process execution with an augmented `PATH`.

use crate::error::ProcessError;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Runs one command line in a working directory.
///
/// `extra_paths` are prepended to the inherited `PATH` so the launched
/// program can find sibling executables.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    working_dir: PathBuf,
    extra_paths: Vec<PathBuf>,
    command: Vec<String>,
    env: HashMap<String, String>,
}

impl ProcessExecutor {
    /// Create an executor. `command[0]` is the program.
    pub fn new(
        working_dir: impl Into<PathBuf>,
        extra_paths: Vec<PathBuf>,
        command: Vec<String>,
        env: HashMap<String, String>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            extra_paths,
            command,
            env,
        }
    }

    fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    fn search_path(&self) -> Option<OsString> {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let paths = self
            .extra_paths
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        match std::env::join_paths(paths) {
            Ok(joined) => Some(joined),
            Err(e) => {
                log::warn!("Could not extend PATH for {}: {e}", self.program());
                None
            }
        }
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.command.iter().skip(1))
            .current_dir(&self.working_dir)
            .envs(&self.env);
        if let Some(path) = self.search_path() {
            cmd.env("PATH", path);
        }
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> ProcessError {
        ProcessError::Spawn {
            program: self.program().to_string(),
            source,
        }
    }

    /// Run to completion and return trimmed stdout.
    ///
    /// A non-zero exit is an error carrying the captured stderr.
    pub fn execute_and_get_result(&self) -> Result<String, ProcessError> {
        log::debug!("Executing {:?} in {}", self.command, self.working_dir.display());
        let output = self
            .build()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ProcessError::Failed {
                program: self.program().to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run to completion, forwarding output lines to the log, and return the
    /// exit code.
    pub fn execute_and_redirect_output(&self) -> Result<i32, ProcessError> {
        log::debug!("Executing {:?} in {}", self.command, self.working_dir.display());
        let mut child = self
            .build()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stderr = child.stderr.take().map(|err| {
            std::thread::spawn(move || forward_lines(err, |line| log::warn!("{line}")))
        });
        if let Some(out) = child.stdout.take() {
            forward_lines(out, |line| log::info!("{line}"));
        }
        if let Some(handle) = stderr {
            let _ = handle.join();
        }

        let status = child.wait().map_err(|e| self.spawn_error(e))?;
        status.code().ok_or_else(|| ProcessError::Failed {
            program: self.program().to_string(),
            code: None,
            stderr: String::new(),
        })
    }
}

fn forward_lines(stream: impl Read, emit: impl Fn(&str)) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => emit(&line),
            Err(_) => break,
        }
    }
}
