//! Windows platform provider implementation.

use crate::providers::shared::parse_reg_query_value;
use crate::traits::PlatformProvider;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;
use vmctl_core::{LaunchStrategy, QuoteStyle};

/// Registry keys holding the Workstation install directory, native view first.
const WORKSTATION_REGISTRY_KEYS: [&str; 2] = [
    r"HKLM\SOFTWARE\VMware, Inc.\VMware Workstation",
    r"HKLM\SOFTWARE\WOW6432Node\VMware, Inc.\VMware Workstation",
];
const INSTALL_PATH_VALUE: &str = "InstallPath";

/// Windows platform provider
pub struct WindowsPlatform;

impl PlatformProvider for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn executable_name(&self, base: &str) -> String {
        if base.ends_with(".exe") {
            base.to_string()
        } else {
            format!("{}.exe", base)
        }
    }

    fn installed_binary(&self) -> Result<Option<PathBuf>> {
        for key in WORKSTATION_REGISTRY_KEYS {
            let output = duct::cmd("reg", ["query", key, "/v", INSTALL_PATH_VALUE])
                .stdout_capture()
                .stderr_null()
                .unchecked()
                .run()
                .context("Failed to query the Windows registry")?;

            if !output.status.success() {
                debug!("Registry key not present: {}", key);
                continue;
            }

            let text = String::from_utf8_lossy(&output.stdout);
            if let Some(dir) = parse_reg_query_value(&text, INSTALL_PATH_VALUE) {
                return Ok(Some(PathBuf::from(dir).join(self.executable_name("vmrun"))));
            }
        }
        Ok(None)
    }

    fn escape_path(&self, path: &str) -> String {
        // The executable is handed to CreateProcess on its own, never
        // concatenated into the parameter string.
        path.to_string()
    }

    fn launch_strategy(&self) -> LaunchStrategy {
        LaunchStrategy::Direct
    }

    fn quote_style(&self) -> QuoteStyle {
        QuoteStyle::Windows
    }
}
