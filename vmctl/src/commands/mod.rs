// Command handlers for vmctl

use crate::cli::{Args, Command};
use anyhow::{Context, Result};
use tracing::{debug, warn};
use vmctl_config::{ConfigOverrides, ControlConfig};
use vmctl_core::{vmctl_println, Product};
use vmctl_platform::{Locator, ResolvedBinary, VMRUN_BINARY};
use vmctl_provider::{Operation, Vmrun};

/// Main command dispatcher. Returns the process exit code.
#[must_use = "command execution results should be handled"]
pub fn execute_command(args: Args) -> Result<i32> {
    match &args.command {
        Command::Operations => {
            debug!("Listing operations");
            list_operations();
            Ok(0)
        }
        Command::Locate => {
            debug!("Locating vmrun");
            let config = load_config(&args)?;
            locate(&config)
        }
        Command::Run(words) => {
            let (name, rest) = words
                .split_first()
                .context("No operation given; run `vmctl operations` for the list")?;
            let op: Operation = name.parse()?;
            debug!("Handling {} with {} argument(s)", op, rest.len());
            let config = load_config(&args)?;
            run_operation(&config, op, rest, args.dry_run)
        }
    }
}

fn load_config(args: &Args) -> Result<ControlConfig> {
    let mut config = ControlConfig::load(args.config.clone())?;
    let product = args
        .product
        .as_deref()
        .map(str::parse::<Product>)
        .transpose()?;

    config.apply_overrides(ConfigOverrides {
        vmx: args.vmx.clone(),
        product,
        user: args.user.clone(),
        password: args.password.clone(),
        vmrun_path: args.vmrun_path.clone(),
        debug: args.debug.then_some(true),
        timeout_secs: args.timeout,
        strict_exit_codes: args.strict.then_some(true),
    });
    debug!(?config, "Effective configuration");
    Ok(config)
}

fn list_operations() {
    for op in Operation::ALL {
        vmctl_println!("{:<14} {}", op.group().to_string(), op.usage());
    }
}

fn locate(config: &ControlConfig) -> Result<i32> {
    match Locator::new().resolve(config.vmrun_path.as_deref()) {
        ResolvedBinary::Resolved { path, source, .. } => {
            vmctl_println!("{} ({:?})", path.display(), source);
            Ok(0)
        }
        ResolvedBinary::Unresolved => {
            vmctl_println!("unresolved");
            Ok(1)
        }
    }
}

fn run_operation(
    config: &ControlConfig,
    op: Operation,
    args: &[String],
    dry_run: bool,
) -> Result<i32> {
    if config.vmx.is_empty() {
        warn!("No VM descriptor configured; sending an empty path to vmrun");
    }
    let vm = Vmrun::from_config(config);

    if dry_run {
        let line = vm.command_line(op, args)?;
        let program = vm.target().binary().command().unwrap_or(VMRUN_BINARY);
        vmctl_println!("{} {}", program, line);
        return Ok(0);
    }

    if op.is_existence_check() {
        // Reuse the table's arity check before picking the single path.
        op.bind(args)?;
        let path = args.first().map(String::as_str).unwrap_or_default();
        let exists = match op {
            Operation::DirectoryExistsInGuest => vm.directory_exists_in_guest(path)?,
            _ => vm.file_exists_in_guest(path)?,
        };
        vmctl_println!("{}", exists);
        return Ok(if exists { 0 } else { 1 });
    }

    for line in vm.invoke(op, args)? {
        vmctl_println!("{}", line);
    }
    Ok(0)
}
