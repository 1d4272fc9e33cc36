//! Command runner port (interface).
//!
//! Every adapter query is, at bottom, "run a command; parse the lines". This
//! trait is the single seam between the adapters and the operating system, so
//! tests can replace it with scripted output.

use std::fmt;
use std::future::Future;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A program plus its discrete argument vector.
///
/// Arguments are handed to the process-spawn API one by one and never pass
/// through a shell, so no argument can be re-interpreted as shell syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Port for executing external diagnostic commands.
pub trait CommandRunner: Send + Sync {
    /// Execute the command and capture its standard output as lines.
    ///
    /// Standard error is discarded. Returns an error if the process could not
    /// be started ([`Error::CommandFailed`]) or exited with a non-zero status
    /// ([`Error::NonZeroExit`]).
    fn execute(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Execute the command, degrading every failure to an empty sequence.
    ///
    /// This is the contract the adapters rely on: a missing tool, a permission
    /// problem and "nothing to report" all look the same to the caller, but
    /// the first two are logged here.
    fn run(&self, invocation: &Invocation) -> impl Future<Output = Vec<String>> + Send {
        async move {
            match self.execute(invocation).await {
                Ok(lines) => lines,
                Err(err @ Error::NonZeroExit { .. }) => {
                    debug!(command = %invocation, error = %err, "Command reported failure");
                    Vec::new()
                }
                Err(err) => {
                    warn!(command = %invocation, error = %err, "Command could not be executed");
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("ps").args(["-p", "42"]).arg("-o").arg("%cpu,%mem");

        assert_eq!(invocation.program(), "ps");
        assert_eq!(invocation.arguments(), ["-p", "42", "-o", "%cpu,%mem"]);
        assert_eq!(invocation.to_string(), "ps -p 42 -o %cpu,%mem");
    }

    #[test]
    fn test_invocation_equality_includes_arguments() {
        let a = Invocation::new("netstat").arg("-tn");
        let b = Invocation::new("netstat").arg("-tulpn");
        assert_ne!(a, b);
        assert_eq!(a, Invocation::new("netstat").args(["-tn"]));
    }
}
