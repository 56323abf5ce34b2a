//! Operating-system process spawner.

use super::{CapturedOutput, Environment, ExitOutcome, ProcessSpawner};
use crate::error::BridgeError;
use std::process::{Command, Stdio};

/// Spawns real child processes with `std::process::Command`.
///
/// The program is resolved on the `PATH` found in the supplied environment,
/// arguments are passed as a pre-split vector, stdin is closed, and stdout
/// and stderr are drained concurrently into separate buffers so a child that
/// fills one pipe cannot deadlock the other. Failing to start the child is a
/// spawn failure; failing to collect from a started child is an abnormal
/// termination.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSpawner;

impl HostSpawner {
    /// Creates a new host spawner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for HostSpawner {
    fn spawn_and_capture(
        &self,
        program: &str,
        args: &[String],
        env: &Environment,
    ) -> Result<CapturedOutput, BridgeError> {
        let child = Command::new(program)
            .args(args)
            .env_clear()
            .envs(env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BridgeError::spawn_failed(program, e.to_string()))?;

        let output = child
            .wait_with_output()
            .map_err(|e| collect_failed(program, &e))?;

        Ok(CapturedOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: ExitOutcome::from(output.status),
        })
    }
}

/// The child started but its output or status could not be collected.
fn collect_failed(program: &str, error: &std::io::Error) -> BridgeError {
    BridgeError::abnormal_termination(program, format!("failed to collect output: {error}"))
}
