// Standard library
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

// External crates
use crate::command_line::CommandLine;
use crate::error::{Result, VmctlError};
use tracing::{debug, warn};

/// Shell exit status for "found but not executable".
const SHELL_NOT_EXECUTABLE: i32 = 126;
/// Shell exit status for "command not found".
const SHELL_NOT_FOUND: i32 = 127;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How the control binary is started on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// Start the executable itself and pass the parameter string verbatim.
    Direct,
    /// Hand `<executable> <params>` to a command interpreter, e.g. `sh -c`.
    Shell {
        program: &'static str,
        flag: &'static str,
    },
}

impl LaunchStrategy {
    pub const POSIX_SHELL: LaunchStrategy = LaunchStrategy::Shell {
        program: "sh",
        flag: "-c",
    };

    /// The strategy matching the host this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            LaunchStrategy::Direct
        } else {
            LaunchStrategy::POSIX_SHELL
        }
    }
}

/// Knobs applied to a single execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Kill the child after this many seconds. `None` blocks indefinitely.
    pub timeout_secs: Option<u64>,
    /// Turn a non-zero exit status into [`VmctlError::ExternalTool`].
    pub strict_exit_codes: bool,
}

/// Standard output of a finished child, one element per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub lines: Vec<String>,
    pub code: Option<i32>,
}

impl CapturedOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            lines: decode_lines(&output.stdout),
            code: output.status.code(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Decode captured bytes into text lines without trimming or filtering.
pub fn decode_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Run `program` with `line` and capture its standard output.
///
/// Standard error is inherited from the parent. The exit status is recorded
/// but only inspected when `options.strict_exit_codes` is set, apart from the
/// shell's own "not found"/"not executable" statuses which are launch errors.
pub fn capture_stdout_lines(
    strategy: LaunchStrategy,
    program: &str,
    line: &CommandLine,
    options: ExecOptions,
) -> Result<CapturedOutput> {
    let shown = format!("{} {}", program, line.redacted());
    debug!(command = %shown, ?strategy, "launching vmrun");

    let output = match strategy {
        LaunchStrategy::Shell {
            program: shell,
            flag,
        } => {
            let full_command = format!("{} {}", program, line.as_str());
            let expression = duct::cmd(shell, [flag, full_command.as_str()])
                .stdout_capture()
                .unchecked();
            let output = run_duct(expression, shell, &shown, options.timeout_secs)?;
            check_shell_launch(program, &output)?;
            output
        }
        LaunchStrategy::Direct => {
            let command = direct_command(program, line.as_str());
            run_std(command, program, &shown, options.timeout_secs)?
        }
    };

    let captured = CapturedOutput::from_output(&output);
    debug!(code = ?captured.code, lines = captured.lines.len(), "vmrun finished");

    if options.strict_exit_codes && !captured.success() {
        return Err(VmctlError::ExternalTool {
            code: captured.code,
            output: captured.lines,
        });
    }
    Ok(captured)
}

fn run_duct(
    expression: duct::Expression,
    shell: &str,
    shown: &str,
    timeout_secs: Option<u64>,
) -> Result<Output> {
    let launch_error = |source| VmctlError::Launch {
        program: shell.to_string(),
        source,
    };

    match timeout_secs {
        None => expression.run().map_err(launch_error),
        Some(secs) => {
            let handle = expression.start().map_err(launch_error)?;
            let start = Instant::now();
            let timeout = Duration::from_secs(secs);

            loop {
                if start.elapsed() >= timeout {
                    if let Err(e) = handle.kill() {
                        warn!("Failed to kill timed out command: {}", e);
                    }
                    return Err(timeout_error(secs, shown));
                }

                match handle.try_wait() {
                    Ok(Some(output)) => return Ok(output.clone()),
                    Ok(None) => thread::sleep(POLL_INTERVAL),
                    Err(e) => {
                        return Err(VmctlError::Io(std::io::Error::new(
                            e.kind(),
                            format!("Error waiting for command '{shown}': {e}"),
                        )))
                    }
                }
            }
        }
    }
}

fn run_std(
    mut command: Command,
    program: &str,
    shown: &str,
    timeout_secs: Option<u64>,
) -> Result<Output> {
    command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::inherit());
    let launch_error = |source| VmctlError::Launch {
        program: program.to_string(),
        source,
    };

    let Some(secs) = timeout_secs else {
        return command.output().map_err(launch_error);
    };

    let mut child = command.spawn().map_err(launch_error)?;
    // Drain stdout on a separate thread so a full pipe cannot stall the child.
    let reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            buf
        })
    });

    let start = Instant::now();
    let timeout = Duration::from_secs(secs);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if start.elapsed() >= timeout {
            if let Err(e) = child.kill() {
                warn!("Failed to kill timed out command: {}", e);
            }
            let _ = child.wait();
            return Err(timeout_error(secs, shown));
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok(Output {
        status,
        stdout,
        stderr: Vec::new(),
    })
}

#[cfg(windows)]
fn direct_command(program: &str, params: &str) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new(program);
    command.raw_arg(params);
    command
}

#[cfg(not(windows))]
fn direct_command(program: &str, params: &str) -> Command {
    // No raw command line outside Windows; fall back to whitespace splitting.
    let mut command = Command::new(program);
    command.args(params.split_whitespace());
    command
}

fn check_shell_launch(program: &str, output: &Output) -> Result<()> {
    let kind = match output.status.code() {
        Some(SHELL_NOT_FOUND) => std::io::ErrorKind::NotFound,
        Some(SHELL_NOT_EXECUTABLE) => std::io::ErrorKind::PermissionDenied,
        _ => return Ok(()),
    };
    Err(VmctlError::Launch {
        program: program.to_string(),
        source: std::io::Error::from(kind),
    })
}

fn timeout_error(secs: u64, shown: &str) -> VmctlError {
    VmctlError::Timeout(format!(
        "Command timed out after {}s: {}\n\nTo debug, try running manually:\n  {}",
        secs, shown, shown
    ))
}
