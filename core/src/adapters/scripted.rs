//! Scripted command runner for adapter tests.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::ports::{CommandRunner, Invocation};

/// Replies to each invocation with canned output.
///
/// Invocations without a script entry behave like a tool that exited with
/// status 1. Every call is recorded, scripted or not.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: HashMap<Invocation, Vec<String>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output of `invocation`.
    pub fn with(mut self, invocation: Invocation, output: &str) -> Self {
        self.replies
            .insert(invocation, output.lines().map(str::to_string).collect());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_of(&self, invocation: &Invocation) -> usize {
        self.calls.lock().iter().filter(|c| *c == invocation).count()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn execute(&self, invocation: &Invocation) -> Result<Vec<String>> {
        self.calls.lock().push(invocation.clone());

        self.replies
            .get(invocation)
            .cloned()
            .ok_or_else(|| Error::NonZeroExit {
                program: invocation.program().to_string(),
                code: Some(1),
            })
    }
}
