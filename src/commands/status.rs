//! `toolpin status`: probe the installed binary without changing anything.

use crate::Context;
use crate::cli::StatusArgs;
use crate::commands::install::working_dir;
use crate::config::{self, ToolpinConfig};
use crate::paths;
use crate::ui;
use anyhow::{Context as _, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use toolchain::{DirectoryCache, InstallConfig, Installer, ProbeResult, ProxyConfig};

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Installed,
    NotInstalled,
    ProbeFailed,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub tool: String,
    pub install_dir: PathBuf,
    pub binary: PathBuf,
    pub state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    pub fn new(installer: &Installer, probe: ProbeResult) -> Self {
        let (state, version, error) = match probe {
            ProbeResult::Installed(version) => (State::Installed, Some(version), None),
            ProbeResult::NotInstalled => (State::NotInstalled, None, None),
            ProbeResult::ProbeFailed(err) => (State::ProbeFailed, None, Some(err.to_string())),
        };
        Self {
            tool: installer.tool().name.clone(),
            install_dir: installer.install_dir(),
            binary: installer.executor_config().binary,
            state,
            version,
            error,
        }
    }
}

pub fn run(ctx: &Context, args: StatusArgs) -> Result<()> {
    let working_dir = working_dir(args.working_dir.as_deref())?;
    let file = ToolpinConfig::load(args.config.as_deref(), &working_dir)?.install;
    let install_root = match args.install_dir {
        Some(dir) => config::resolve_against(&working_dir, &dir),
        None => match file.install_dir {
            Some(dir) => config::resolve_against(&working_dir, Path::new(&dir)),
            None => paths::default_install_root(&working_dir),
        },
    };

    // Probing never touches the cache.
    let config = InstallConfig::new(install_root, DirectoryCache::new(working_dir.join(".cache")))
        .working_dir(&working_dir);
    let installer = Installer::new(config, args.tool.spec(), ProxyConfig::none());
    let report = StatusReport::new(&installer, installer.probe());

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Could not encode status")?;
        println!("{json}");
        return Ok(());
    }

    if !ctx.quiet {
        ui::header(&format!("{} status", report.tool));
        ui::kv("Install dir", &report.install_dir.display().to_string());
        ui::kv("Binary", &report.binary.display().to_string());
    }
    match (&report.state, &report.version, &report.error) {
        (State::Installed, Some(version), _) => {
            ui::kv("Version", &version.green().to_string());
        }
        (State::ProbeFailed, _, error) => {
            ui::warn(&format!(
                "{} is present but did not report a version: {}",
                report.tool,
                error.as_deref().unwrap_or("unknown error")
            ));
        }
        _ => ui::kv("Version", &"not installed".dimmed().to_string()),
    }
    Ok(())
}
