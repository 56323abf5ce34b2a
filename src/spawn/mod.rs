//! Process-spawn capability.
//!
//! The bridge never touches process-creation primitives directly. It asks a
//! [`ProcessSpawner`] to run one program with one environment and hand back
//! both output streams plus how the process ended. [`HostSpawner`] is the
//! implementation backed by the operating system.

mod host;

pub use host::HostSpawner;

use crate::error::BridgeError;
use std::ffi::{OsStr, OsString};
use std::fmt::Debug;

/// Capability for running a program to completion and capturing its output.
///
/// Implementations must resolve `program` on the search path carried by
/// `env` (execvp-style), pass `args` verbatim without shell interpretation,
/// give the child exactly the variables in `env`, and keep stdout and stderr
/// in separate buffers.
///
/// # Thread Safety
///
/// Spawners must be `Send + Sync`; concurrent calls each run their own child
/// and must not share capture buffers.
///
/// # Example
///
/// ```rust
/// use wizardry_bridge::spawn::{CapturedOutput, Environment, ExitOutcome, ProcessSpawner};
/// use wizardry_bridge::error::BridgeError;
///
/// #[derive(Debug)]
/// struct Canned;
///
/// impl ProcessSpawner for Canned {
///     fn spawn_and_capture(
///         &self,
///         program: &str,
///         _args: &[String],
///         _env: &Environment,
///     ) -> Result<CapturedOutput, BridgeError> {
///         Ok(CapturedOutput::new(format!("ran {program}\n"), "", ExitOutcome::Exited(0)))
///     }
/// }
/// ```
pub trait ProcessSpawner: Send + Sync + Debug {
    /// Runs `program` with `args` and `env`, blocking until it terminates.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::SpawnFailed` if the process could not be
    /// created. A process that starts and then ends in any way is reported
    /// through [`CapturedOutput::status`], not as an error.
    fn spawn_and_capture(
        &self,
        program: &str,
        args: &[String],
        env: &Environment,
    ) -> Result<CapturedOutput, BridgeError>;
}

/// Output and termination state of a finished child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Everything the child wrote to stdout, lossily decoded as UTF-8
    pub stdout: String,
    /// Everything the child wrote to stderr, lossily decoded as UTF-8
    pub stderr: String,
    /// How the child ended
    pub status: ExitOutcome,
}

impl CapturedOutput {
    /// Creates a captured output record.
    #[must_use]
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, status: ExitOutcome) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            status,
        }
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with this status code
    Exited(i32),
    /// Killed by this signal number
    Signaled(i32),
    /// The platform reported no exit code and no signal
    Unknown,
}

impl ExitOutcome {
    /// Returns the exit code for a normal exit.
    #[must_use]
    pub fn code(self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(code),
            _ => None,
        }
    }

    /// Human-readable description of a non-normal ending.
    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Exited(code) => format!("exited with status {code}"),
            Self::Signaled(signal) => format!("terminated by signal {}", signal_name(signal)),
            Self::Unknown => "no exit status was reported".to_string(),
        }
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }

        Self::Unknown
    }
}

#[cfg(unix)]
fn signal_name(signal: i32) -> String {
    nix::sys::signal::Signal::try_from(signal)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| signal.to_string())
}

#[cfg(not(unix))]
fn signal_name(signal: i32) -> String {
    signal.to_string()
}

/// A snapshot of environment variables handed to a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Snapshots the current process environment, unfiltered.
    #[must_use]
    pub fn inherit() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Creates an environment with no variables.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets a variable, replacing any existing value.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        let key = key.into();
        self.vars.retain(|(k, _)| *k != key);
        self.vars.push((key, value.into()));
        self
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars
            .iter()
            .find(|(k, _)| k.as_os_str() == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Iterates over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if there are no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
