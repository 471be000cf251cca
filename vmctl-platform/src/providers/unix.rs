//! Unix platform provider implementation.

use crate::providers::shared::posix_escape_path;
use crate::traits::PlatformProvider;
use anyhow::Result;
use std::path::PathBuf;
use vmctl_core::{LaunchStrategy, QuoteStyle};

/// Unix platform provider (Linux and other Unix-like systems)
pub struct UnixPlatform;

impl PlatformProvider for UnixPlatform {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn executable_name(&self, base: &str) -> String {
        base.to_string()
    }

    fn installed_binary(&self) -> Result<Option<PathBuf>> {
        // Workstation for Linux registers nothing beyond its PATH entry.
        Ok(None)
    }

    fn escape_path(&self, path: &str) -> String {
        posix_escape_path(path)
    }

    fn launch_strategy(&self) -> LaunchStrategy {
        LaunchStrategy::POSIX_SHELL
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Posix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_has_no_installation_metadata() {
        assert!(UnixPlatform.installed_binary().unwrap().is_none());
    }

    #[test]
    fn test_unix_launches_through_sh() {
        assert_eq!(UnixPlatform.launch_strategy(), LaunchStrategy::POSIX_SHELL);
        assert_eq!(UnixPlatform.executable_name("vmrun"), "vmrun");
    }
}
