//! Core traits for platform abstraction.
//!
//! Locating vmrun and launching it differ per operating system: Windows
//! records the Workstation install directory in the registry and starts
//! executables directly, macOS ships vmrun inside the Fusion bundle, and
//! every Unix starts it through `sh -c`.

use anyhow::Result;
use std::path::PathBuf;
use vmctl_core::{LaunchStrategy, QuoteStyle};

/// Platform-specific behavior needed to find and run the control binary.
pub trait PlatformProvider: Send + Sync {
    /// Get the platform name (e.g., "unix", "windows", "macos")
    fn name(&self) -> &'static str;

    /// Get the correct executable name for the platform (adds .exe on Windows)
    fn executable_name(&self, base: &str) -> String;

    /// Look up vmrun in the product's registered installation metadata.
    ///
    /// Returns `Ok(None)` when the platform keeps no such metadata or the
    /// product is not installed.
    fn installed_binary(&self) -> Result<Option<PathBuf>>;

    /// Escape a resolved executable path so it survives command-line
    /// construction as a single token.
    fn escape_path(&self, path: &str) -> String;

    /// How child processes are started.
    fn launch_strategy(&self) -> LaunchStrategy;

    /// How operation arguments are quoted.
    fn quote_style(&self) -> QuoteStyle;
}
