//! The structured record handed back to the script context.

use crate::error::BridgeError;
use crate::spawn::{CapturedOutput, ExitOutcome};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of one bridge invocation.
///
/// Serializes as `{"stdout", "stderr", "exitCode", "error"}` with `error`
/// rendered as an empty string when unset. Exactly one of these holds:
/// `error` is `None` and `exit_code` is the child's real status, or `error`
/// is `Some` and `exit_code` is [`ExecutionResult::ADVISORY_EXIT_CODE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Real exit status, or the advisory value when `error` is set
    pub exit_code: i32,
    /// Why the invocation itself failed; never set for a completed process
    #[serde(
        default,
        serialize_with = "serialize_error",
        deserialize_with = "deserialize_error"
    )]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Exit code reported when no real exit status exists.
    pub const ADVISORY_EXIT_CODE: i32 = 1;

    /// A process that ran and exited normally with `exit_code`.
    #[must_use]
    pub fn exited(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            error: None,
        }
    }

    /// A failed invocation with no captured output.
    #[must_use]
    pub fn failure(error: &BridgeError) -> Self {
        Self::failure_with_output(error, String::new(), String::new())
    }

    /// A failed invocation that still captured some output before failing.
    #[must_use]
    pub fn failure_with_output(
        error: &BridgeError,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Self::ADVISORY_EXIT_CODE,
            error: Some(error.to_string()),
        }
    }

    /// Builds the result for a child that was spawned and has terminated.
    ///
    /// Any ending other than a normal exit becomes an abnormal termination
    /// error; the output captured up to that point is kept.
    #[must_use]
    pub fn from_capture(program: &str, captured: CapturedOutput) -> Self {
        match captured.status {
            ExitOutcome::Exited(code) => Self::exited(captured.stdout, captured.stderr, code),
            other => Self::failure_with_output(
                &BridgeError::abnormal_termination(program, other.describe()),
                captured.stdout,
                captured.stderr,
            ),
        }
    }

    /// Returns true if the invocation mechanics failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true if the process ran and exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.is_error() && self.exit_code == 0
    }
}

fn serialize_error<S>(error: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(error.as_deref().unwrap_or(""))
}

fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}
