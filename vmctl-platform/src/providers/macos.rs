//! macOS platform provider implementation.
//!
//! macOS is Unix-like, but VMware Fusion installs vmrun inside its
//! application bundle instead of on PATH.

use crate::providers::shared::posix_escape_path;
use crate::traits::PlatformProvider;
use anyhow::Result;
use std::path::PathBuf;
use vmctl_core::{LaunchStrategy, QuoteStyle};

const FUSION_VMRUN_PATH: &str = "/Applications/VMware Fusion.app/Contents/Library/vmrun";

/// macOS platform provider
pub struct MacOSPlatform;

impl PlatformProvider for MacOSPlatform {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn executable_name(&self, base: &str) -> String {
        base.to_string()
    }

    fn installed_binary(&self) -> Result<Option<PathBuf>> {
        let path = PathBuf::from(FUSION_VMRUN_PATH);
        Ok(path.is_file().then_some(path))
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
    fn test_fusion_bundle_path_is_escaped() {
        assert_eq!(
            MacOSPlatform.escape_path(FUSION_VMRUN_PATH),
            "/Applications/VMware\\ Fusion.app/Contents/Library/vmrun"
        );
    }
}
