//! Host platform detection.
//!
//! The detected [`Platform`] decides the executable suffix of the installed
//! binary and is the input to per-platform archive selection.
//!
//! # Example
//!
//! ```
//! use toolchain::platform;
//!
//! let platform = platform::detect().expect("unsupported platform");
//! println!("Running on: {}", platform.triple);
//! ```

use crate::error::{Error, Result};
use crate::types::Platform;

/// Detect the current platform.
///
/// # Supported Platforms
///
/// | OS      | Arch    | Triple                       |
/// |---------|---------|------------------------------|
/// | macOS   | ARM64   | aarch64-apple-darwin         |
/// | macOS   | x86_64  | x86_64-apple-darwin          |
/// | Linux   | ARM64   | aarch64-unknown-linux-gnu    |
/// | Linux   | x86_64  | x86_64-unknown-linux-gnu     |
/// | Linux   | RISC-V  | riscv64gc-unknown-linux-gnu  |
/// | Windows | ARM64   | aarch64-pc-windows-msvc      |
/// | Windows | x86_64  | x86_64-pc-windows-msvc       |
///
/// # Errors
///
/// Returns `Error::UnsupportedPlatform` if the current platform is not supported.
pub fn detect() -> Result<Platform> {
    from_parts(std::env::consts::OS, std::env::consts::ARCH)
}

fn from_parts(os: &str, arch: &str) -> Result<Platform> {
    let triple = match (os, arch) {
        ("macos", "aarch64") => "aarch64-apple-darwin",
        ("macos", "x86_64") => "x86_64-apple-darwin",

        ("linux", "aarch64") => "aarch64-unknown-linux-gnu",
        ("linux", "x86_64") => "x86_64-unknown-linux-gnu",
        ("linux", "riscv64") => "riscv64gc-unknown-linux-gnu",

        ("windows", "aarch64") => "aarch64-pc-windows-msvc",
        ("windows", "x86_64") => "x86_64-pc-windows-msvc",

        _ => {
            return Err(Error::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            });
        }
    };

    Ok(Platform::new(os, arch, triple))
}

/// The detected platform, or a best-effort description when detection fails.
///
/// Used where a platform is only needed for naming (executable suffix), so
/// an unknown host should not abort.
#[must_use]
pub fn current() -> Platform {
    detect().unwrap_or_else(|_| {
        let os = std::env::consts::OS;
        let arch = std::env::consts::ARCH;
        Platform::new(os, arch, format!("{arch}-unknown-{os}"))
    })
}
