use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use toolchain::Tool;

#[derive(Parser)]
#[command(name = "toolpin")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Install pinned versions of project-local tools", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Make sure the requested tool version is installed
    Install(InstallArgs),

    /// Report which version of the tool is installed
    Status(StatusArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Install
// ============================================================================

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Tool to install
    #[arg(long, default_value_t = Tool::Volta)]
    pub tool: Tool,

    /// Version to install, with its `v` prefix (e.g. v1.1.1)
    #[arg(long, env = "TOOLPIN_VERSION")]
    pub version: Option<String>,

    /// Base URL releases are downloaded from
    #[arg(long, env = "TOOLPIN_DOWNLOAD_ROOT")]
    pub download_root: Option<String>,

    /// Install root [default: <working-dir>/.toolpin]
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Archive cache directory
    #[arg(long, env = "TOOLPIN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory the tool runs in [default: current directory]
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// User name for the download server
    #[arg(long, env = "TOOLPIN_USERNAME", requires = "password")]
    pub username: Option<String>,

    /// Password for the download server
    #[arg(long, env = "TOOLPIN_PASSWORD", hide_env_values = true, requires = "username")]
    pub password: Option<String>,

    /// Do nothing and exit successfully
    #[arg(long, env = "TOOLPIN_SKIP")]
    pub skip: bool,

    /// Settings file [default: <working-dir>/toolpin.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Status
// ============================================================================

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Tool to inspect
    #[arg(long, default_value_t = Tool::Volta)]
    pub tool: Tool,

    /// Install root [default: <working-dir>/.toolpin]
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Directory the tool runs in [default: current directory]
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Settings file [default: <working-dir>/toolpin.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
