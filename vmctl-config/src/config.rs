//! The control configuration consumed by the vmrun controller.
//!
//! Values are layered, later sources winning:
//! defaults → YAML file → `VMCTL_*` environment → command-line flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use vmctl_core::error::{Result, VmctlError};
use vmctl_core::{Credentials, ExecOptions, Product};

pub const ENV_VMX: &str = "VMCTL_VMX";
pub const ENV_PRODUCT: &str = "VMCTL_PRODUCT";
pub const ENV_USER: &str = "VMCTL_USER";
pub const ENV_PASSWORD: &str = "VMCTL_PASSWORD";
pub const ENV_VMRUN_PATH: &str = "VMCTL_VMRUN_PATH";
pub const ENV_DEBUG: &str = "VMCTL_DEBUG";
pub const ENV_TIMEOUT: &str = "VMCTL_TIMEOUT";
pub const ENV_STRICT: &str = "VMCTL_STRICT";

/// Everything needed to build an invocation target.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// Path to the `.vmx` descriptor of the target VM.
    pub vmx: String,

    /// Product family passed with `-T`.
    pub product: Product,

    /// Guest/host admin user passed with `-gu`.
    pub user: String,

    /// Password passed with `-gp`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,

    /// Explicit vmrun location; skips discovery when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmrun_path: Option<String>,

    /// Echo every assembled command line to stderr before launch.
    pub debug: bool,

    /// Kill vmrun after this many seconds. Unset blocks indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Treat a non-zero vmrun exit status as an error.
    pub strict_exit_codes: bool,
}

impl fmt::Debug for ControlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlConfig")
            .field("vmx", &self.vmx)
            .field("product", &self.product)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "****" })
            .field("vmrun_path", &self.vmrun_path)
            .field("debug", &self.debug)
            .field("timeout_secs", &self.timeout_secs)
            .field("strict_exit_codes", &self.strict_exit_codes)
            .finish()
    }
}

/// Values supplied on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub vmx: Option<String>,
    pub product: Option<Product>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub vmrun_path: Option<String>,
    pub debug: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub strict_exit_codes: Option<bool>,
}

/// `<config_dir>/vmctl/config.yaml`, if a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vmctl").join("config.yaml"))
}

impl ControlConfig {
    /// Load from file and environment.
    ///
    /// An explicit `config_path` must exist. Without one the default path is
    /// used when present, otherwise built-in defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.expand_paths();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VmctlError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str(&content)
            .map_err(|e| VmctlError::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `VMCTL_*` variables from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(vmx) = lookup(ENV_VMX) {
            self.vmx = vmx;
        }
        if let Some(product) = lookup(ENV_PRODUCT) {
            self.product = product
                .parse()
                .map_err(|e| VmctlError::Config(format!("{ENV_PRODUCT}: {e}")))?;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.user = user;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(path) = lookup(ENV_VMRUN_PATH) {
            self.vmrun_path = Some(path);
        }
        if let Some(value) = lookup(ENV_DEBUG) {
            self.debug = parse_flag(ENV_DEBUG, &value)?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT) {
            let secs = value.trim().parse::<u64>().map_err(|_| {
                VmctlError::Config(format!("{ENV_TIMEOUT}: expected seconds, got '{value}'"))
            })?;
            self.timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(value) = lookup(ENV_STRICT) {
            self.strict_exit_codes = parse_flag(ENV_STRICT, &value)?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(vmx) = overrides.vmx {
            self.vmx = vmx;
        }
        if let Some(product) = overrides.product {
            self.product = product;
        }
        if let Some(user) = overrides.user {
            self.user = user;
        }
        if let Some(password) = overrides.password {
            self.password = password;
        }
        if let Some(path) = overrides.vmrun_path {
            self.vmrun_path = Some(path);
        }
        if let Some(debug) = overrides.debug {
            self.debug = debug;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = (secs > 0).then_some(secs);
        }
        if let Some(strict) = overrides.strict_exit_codes {
            self.strict_exit_codes = strict;
        }
        self.expand_paths();
    }

    /// Expand a leading `~` in path-valued fields.
    pub fn expand_paths(&mut self) {
        if self.vmx.starts_with('~') {
            let expanded = shellexpand::tilde(&self.vmx).into_owned();
            self.vmx = expanded;
        }
        if let Some(path) = self.vmrun_path.as_mut().filter(|p| p.starts_with('~')) {
            let expanded = shellexpand::tilde(path.as_str()).into_owned();
            *path = expanded;
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.password.clone())
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            timeout_secs: self.timeout_secs,
            strict_exit_codes: self.strict_exit_codes,
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(VmctlError::Config(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}
