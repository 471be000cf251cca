//! A runner that records invocations instead of spawning vmrun.

use crate::runner::CommandRunner;
use std::collections::VecDeque;
use std::sync::Mutex;
use vmctl_core::error::Result;
use vmctl_core::{CapturedOutput, CommandLine, ExecOptions, LaunchStrategy};

/// One call observed by [`RecordingRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub strategy: LaunchStrategy,
    pub program: String,
    pub params: String,
    pub options: ExecOptions,
}

/// Replies with queued output (or nothing) and remembers every call.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<VecDeque<Vec<String>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose first call prints `lines`.
    pub fn replying<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        let runner = Self::new();
        runner.push_reply(lines);
        runner
    }

    /// Queue stdout for the next call that has no reply yet.
    pub fn push_reply<S: Into<String>>(&self, lines: impl IntoIterator<Item = S>) {
        let lines = lines.into_iter().map(Into::into).collect();
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(lines);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Parameter strings of every call, in order.
    pub fn params(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.params).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(
        &self,
        strategy: LaunchStrategy,
        program: &str,
        line: &CommandLine,
        options: ExecOptions,
    ) -> Result<CapturedOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                strategy,
                program: program.to_string(),
                params: line.as_str().to_string(),
                options,
            });
        }
        let lines = self
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_default();
        Ok(CapturedOutput {
            lines,
            code: Some(0),
        })
    }
}
