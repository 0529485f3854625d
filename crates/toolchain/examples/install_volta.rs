//! Example: Install Volta into ./.toolpin
//!
//! Run with: cargo run -p toolchain --example install_volta -- v1.1.1

use toolchain::{DirectoryCache, InstallConfig, InstallOptions, Installer, ProxyConfig, Tool};

fn main() {
    println!("Volta Installer");
    println!("===============\n");

    let version = std::env::args().nth(1).unwrap_or_else(|| "v1.1.1".to_string());
    let cache_root = std::env::temp_dir().join("toolpin-example-cache");
    let config = InstallConfig::new(".toolpin", DirectoryCache::new(cache_root));
    let installer = Installer::new(config, Tool::Volta.spec(), ProxyConfig::from_env());

    println!("Current state: {}", installer.probe());
    println!("\nInstalling Volta {version}...");

    match installer.install(&InstallOptions::new(version)) {
        Ok(outcome) => {
            println!("\n{outcome}");
            println!("Now: {}", installer.probe());
        }
        Err(e) => {
            eprintln!("\nInstallation failed: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            eprintln!("  hint: {}", e.category().advice());
            std::process::exit(1);
        }
    }
}
