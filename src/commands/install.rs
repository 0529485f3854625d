//! `toolpin install`: make sure the pinned tool version is in place.

use crate::Context;
use crate::cli::InstallArgs;
use crate::config::{self, ToolpinConfig};
use crate::paths;
use crate::ui;
use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};
use toolchain::{
    Credentials, DirectoryCache, InstallConfig, InstallOptions, InstallOutcome, Installer,
    ProxyConfig, Tool,
};

/// Settings for one install, after flags, environment and `toolpin.toml`
/// have been merged.
#[derive(Debug)]
pub struct InstallPlan {
    pub tool: Tool,
    pub version: String,
    pub download_root: Option<String>,
    pub install_root: PathBuf,
    pub cache_dir: PathBuf,
    pub working_dir: PathBuf,
    pub credentials: Option<Credentials>,
    pub skip: bool,
}

impl InstallPlan {
    pub fn resolve(args: InstallArgs) -> Result<Self> {
        let working_dir = working_dir(args.working_dir.as_deref())?;
        let file = ToolpinConfig::load(args.config.as_deref(), &working_dir)?.install;

        let skip = args.skip || file.skip.unwrap_or(false);

        let version = match args.version.or(file.version) {
            Some(version) => version,
            // A skipped run needs no version.
            None if skip => String::new(),
            None => bail!(
                "No {} version given. Pass --version or set [install] version in {}",
                args.tool,
                paths::CONFIG_FILE_NAME
            ),
        };

        let install_root = match args.install_dir {
            Some(dir) => config::resolve_against(&working_dir, &dir),
            None => match file.install_dir {
                Some(dir) => config::resolve_against(&working_dir, Path::new(&dir)),
                None => paths::default_install_root(&working_dir),
            },
        };

        let cache_dir = match args.cache_dir {
            Some(dir) => config::resolve_against(&working_dir, &dir),
            None => match file.cache_dir {
                Some(dir) => config::resolve_against(&working_dir, Path::new(&dir)),
                None => paths::cache_dir()?,
            },
        };

        let credentials = match (args.username, args.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            _ => bail!("--username and --password must be given together"),
        };

        Ok(Self {
            tool: args.tool,
            version,
            download_root: args.download_root.or(file.download_root),
            install_root,
            cache_dir,
            working_dir,
            credentials,
            skip,
        })
    }

    pub fn options(&self) -> InstallOptions {
        let mut options = InstallOptions::new(&self.version);
        if let Some(root) = &self.download_root {
            options = options.download_root(root);
        }
        if let Some(credentials) = &self.credentials {
            options = options.credentials(credentials.clone());
        }
        options
    }

    pub fn installer(&self) -> Installer {
        let config = InstallConfig::new(&self.install_root, DirectoryCache::new(&self.cache_dir))
            .working_dir(&self.working_dir);
        Installer::new(config, self.tool.spec(), ProxyConfig::from_env())
    }
}

/// Working directory from the flag, or the current directory.
pub fn working_dir(flag: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    Ok(match flag {
        Some(dir) => config::resolve_against(&cwd, dir),
        None => cwd,
    })
}

pub fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    let plan = InstallPlan::resolve(args)?;
    if plan.skip {
        ui::info(&format!("Skipping {} installation", plan.tool));
        return Ok(());
    }
    log::debug!("Install plan: {plan:?}");

    let outcome = plan
        .installer()
        .install(&plan.options())
        .with_context(|| format!("Failed to install {} {}", plan.tool, plan.version))?;

    match &outcome {
        InstallOutcome::AlreadyInstalled { tool, version } => {
            if !ctx.quiet {
                ui::success(&format!("{tool} {version} is already installed, skipped"));
            }
        }
        InstallOutcome::Installed {
            tool,
            version,
            path,
        } => {
            ui::success(&format!("Installed {tool} version {version}"));
            if ctx.verbose > 0 {
                ui::kv("Binary", &path.display().to_string());
                ui::kv("Cache", &plan.cache_dir.display().to_string());
            }
        }
    }
    Ok(())
}
