//! The seam between the controller and the operating system.

use vmctl_core::error::Result;
use vmctl_core::{capture_stdout_lines, CapturedOutput, CommandLine, ExecOptions, LaunchStrategy};

/// Runs one fully assembled vmrun invocation and returns its stdout lines.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        strategy: LaunchStrategy,
        program: &str,
        line: &CommandLine,
        options: ExecOptions,
    ) -> Result<CapturedOutput>;
}

/// Spawns a real child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        strategy: LaunchStrategy,
        program: &str,
        line: &CommandLine,
        options: ExecOptions,
    ) -> Result<CapturedOutput> {
        capture_stdout_lines(strategy, program, line, options)
    }
}
