pub mod command_line;
pub mod command_stream;
pub mod error;
pub mod output_macros;

pub use command_line::{CommandLine, Credentials, Product, QuoteStyle};
pub use command_stream::{capture_stdout_lines, CapturedOutput, ExecOptions, LaunchStrategy};
pub use error::{Result, VmctlError};
