//! vmrun controller library.
//!
//! Turns typed operation requests into vmrun command lines, runs them
//! through a [`CommandRunner`] and hands back the raw output lines.

pub mod modes;
pub mod operations;
pub mod runner;
pub mod target;
pub mod vmrun;

// When the `test-helpers` feature is enabled, include the recording runner.
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

// Re-export common types for convenience
pub use modes::{CloneMode, PowerMode, RunMode, ShareMode, VariableMode};
pub use operations::{ArgSpec, Group, Operation, Presence};
pub use runner::{CommandRunner, ProcessRunner};
pub use target::InvocationTarget;
pub use vmctl_core::error::{Result as VmctlResult, VmctlError};
pub use vmrun::Vmrun;
