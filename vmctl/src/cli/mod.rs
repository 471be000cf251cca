// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "vmctl")]
#[command(about = "Drive VMware virtual machines through vmrun")]
#[command(version)]
#[command(after_help = "Run `vmctl operations` to list every vmrun operation and its arguments.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a custom configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the .vmx file of the target VM
    #[arg(long, global = true)]
    pub vmx: Option<String>,

    /// Product family passed with -T (ws, server, server1, fusion, player)
    #[arg(short = 'T', long, global = true)]
    pub product: Option<String>,

    /// Guest user passed with -gu
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Guest password passed with -gp
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Explicit vmrun executable; skips discovery
    #[arg(long, global = true)]
    pub vmrun_path: Option<String>,

    /// Kill vmrun after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail when vmrun exits with a non-zero status
    #[arg(long, global = true)]
    pub strict: bool,

    /// Print each vmrun command line to stderr before running it
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Show what would be executed without running
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every vmrun operation with its arguments
    Operations,

    /// Show which vmrun executable would be used
    Locate,

    /// Any vmrun operation, e.g. `stop hard` or `revert-to-snapshot clean`
    #[command(external_subcommand)]
    Run(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_arguments_are_passed_raw() {
        let args = Args::try_parse_from([
            "vmctl",
            "--vmx",
            "/vms/a.vmx",
            "--dry-run",
            "run-program-in-guest",
            "n",
            "/bin/ls",
            "-la",
        ])
        .unwrap();

        assert!(args.dry_run);
        assert_eq!(args.vmx.as_deref(), Some("/vms/a.vmx"));
        match args.command {
            Command::Run(words) => {
                assert_eq!(words, vec!["run-program-in-guest", "n", "/bin/ls", "-la"])
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_builtin_subcommands() {
        let args = Args::try_parse_from(["vmctl", "operations"]).unwrap();
        assert!(matches!(args.command, Command::Operations));

        let args = Args::try_parse_from(["vmctl", "--timeout", "30", "locate"]).unwrap();
        assert!(matches!(args.command, Command::Locate));
        assert_eq!(args.timeout, Some(30));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
