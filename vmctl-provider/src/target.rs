//! The fixed part of every vmrun invocation.

use vmctl_config::ControlConfig;
use vmctl_core::{Credentials, ExecOptions, LaunchStrategy, Product, QuoteStyle};
use vmctl_platform::{Locator, ResolvedBinary};

/// VM, credentials, product and resolved executable shared by all
/// operations of one controller. Immutable once built.
#[derive(Debug, Clone)]
pub struct InvocationTarget {
    vmx: String,
    product: Product,
    credentials: Credentials,
    binary: ResolvedBinary,
    launch: LaunchStrategy,
    quote_style: QuoteStyle,
    debug: bool,
    options: ExecOptions,
}

impl InvocationTarget {
    /// A target for `vmx` with host launch conventions and no binary yet.
    pub fn new(vmx: impl Into<String>, product: Product, credentials: Credentials) -> Self {
        Self {
            vmx: vmx.into(),
            product,
            credentials,
            binary: ResolvedBinary::Unresolved,
            launch: LaunchStrategy::host(),
            quote_style: QuoteStyle::host(),
            debug: false,
            options: ExecOptions::default(),
        }
    }

    /// Resolve the binary for the current host and take everything else
    /// from `config`.
    pub fn from_config(config: &ControlConfig) -> Self {
        Self::from_config_with_locator(config, &Locator::new())
    }

    pub fn from_config_with_locator(config: &ControlConfig, locator: &Locator) -> Self {
        let platform = locator.platform();
        Self::new(config.vmx.clone(), config.product, config.credentials())
            .with_binary(locator.resolve(config.vmrun_path.as_deref()))
            .with_launch(platform.launch_strategy(), platform.quote_style())
            .with_debug(config.debug)
            .with_options(config.exec_options())
    }

    pub fn with_binary(mut self, binary: ResolvedBinary) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_launch(mut self, launch: LaunchStrategy, quote_style: QuoteStyle) -> Self {
        self.launch = launch;
        self.quote_style = quote_style;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn vmx(&self) -> &str {
        &self.vmx
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn binary(&self) -> &ResolvedBinary {
        &self.binary
    }

    pub fn launch(&self) -> LaunchStrategy {
        self.launch
    }

    pub fn quote_style(&self) -> QuoteStyle {
        self.quote_style
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn options(&self) -> ExecOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vmctl_platform::ResolutionSource;

    #[test]
    fn test_override_from_config_is_used_verbatim() {
        let config = ControlConfig {
            vmx: "/vms/a.vmx".into(),
            vmrun_path: Some("/opt/my vmware/vmrun".into()),
            debug: true,
            timeout_secs: Some(5),
            ..Default::default()
        };
        let target = InvocationTarget::from_config(&config);

        assert_eq!(target.vmx(), "/vms/a.vmx");
        assert!(target.debug());
        assert_eq!(target.options().timeout_secs, Some(5));
        assert_eq!(
            target.binary(),
            &ResolvedBinary::Resolved {
                path: PathBuf::from("/opt/my vmware/vmrun"),
                command: "/opt/my vmware/vmrun".into(),
                source: ResolutionSource::Override,
            }
        );
    }

    #[test]
    fn test_new_target_starts_unresolved() {
        let target = InvocationTarget::new("a.vmx", Product::Player, Credentials::default());
        assert!(!target.binary().is_resolved());
        assert_eq!(target.product(), Product::Player);
        assert_eq!(target.launch(), LaunchStrategy::host());
    }
}
