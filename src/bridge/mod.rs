//! The execution bridge.
//!
//! Turns an untyped [`CallDescriptor`] from the script context into a host
//! process and reports back an [`ExecutionResult`]. The bridge always
//! returns: malformed requests, spawn failures and abnormal terminations are
//! all folded into the result record rather than raised.
//!
//! ## Flow
//!
//! ```text
//! CallDescriptor --to_argument_vector--> ArgumentVector
//!        |                                     |
//!        | (reject: empty / non-string)        | spawn_and_capture(program, args, env)
//!        v                                     v
//!   ExecutionResult::failure        CapturedOutput --from_capture--> ExecutionResult
//! ```
//!
//! ## Trust
//!
//! There is no allow-list, argument sanitization, timeout, or cap on
//! concurrent calls. Whoever can reach the bridge can run any program the
//! host user can. Whether that is acceptable is decided by the integrating
//! shell, which controls what script content gets loaded.

mod descriptor;
mod result;

pub use descriptor::{ArgumentVector, CallDescriptor, DynamicValue};
pub use result::ExecutionResult;

use crate::error::BridgeError;
use crate::spawn::{CapturedOutput, Environment, HostSpawner, ProcessSpawner};
use crate::types::InvocationId;

/// Executes host commands on behalf of a script context.
///
/// Holds no mutable state; a single bridge can serve any number of
/// concurrent calls, each of which owns its own child and buffers.
///
/// # Example
///
/// ```rust,no_run
/// use wizardry_bridge::bridge::{CallDescriptor, ExecutionBridge};
///
/// let bridge = ExecutionBridge::new();
/// let result = bridge.execute(&CallDescriptor::from_strings(["echo", "hello"]));
/// assert_eq!(result.stdout, "hello\n");
/// assert_eq!(result.exit_code, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionBridge<S = HostSpawner> {
    spawner: S,
}

impl ExecutionBridge<HostSpawner> {
    /// Creates a bridge that spawns real host processes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: ProcessSpawner> ExecutionBridge<S> {
    /// Creates a bridge over a custom spawner.
    #[must_use]
    pub fn with_spawner(spawner: S) -> Self {
        Self { spawner }
    }

    /// Returns the spawner in use.
    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Runs the command described by `descriptor` and blocks until it ends.
    ///
    /// The child inherits this process's environment as it is at call time.
    pub fn execute(&self, descriptor: &CallDescriptor) -> ExecutionResult {
        let invocation_id = InvocationId::new();
        tracing::info!(
            invocation_id = %invocation_id,
            descriptor = %descriptor,
            "executing command"
        );

        let result = match self.spawn(descriptor, &Environment::inherit()) {
            Ok((argv, captured)) => ExecutionResult::from_capture(argv.program(), captured),
            Err(error) => ExecutionResult::failure(&error),
        };

        match result.error.as_deref() {
            None => tracing::debug!(
                invocation_id = %invocation_id,
                exit_code = result.exit_code,
                stdout_len = result.stdout.len(),
                stderr_len = result.stderr.len(),
                "command finished"
            ),
            Some(error) => tracing::warn!(
                invocation_id = %invocation_id,
                error,
                "command failed"
            ),
        }

        result
    }

    fn spawn(
        &self,
        descriptor: &CallDescriptor,
        env: &Environment,
    ) -> Result<(ArgumentVector, CapturedOutput), BridgeError> {
        let argv = descriptor.to_argument_vector()?;
        let captured = self
            .spawner
            .spawn_and_capture(argv.program(), argv.args(), env)?;
        Ok((argv, captured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::ExitOutcome;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every call and replies with a fixed outcome.
    #[derive(Debug)]
    struct RecordingSpawner {
        calls: AtomicUsize,
        last: Mutex<Option<(String, Vec<String>, Environment)>>,
        reply: Result<CapturedOutput, BridgeError>,
    }

    impl RecordingSpawner {
        fn replying(reply: Result<CapturedOutput, BridgeError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                reply,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProcessSpawner for RecordingSpawner {
        fn spawn_and_capture(
            &self,
            program: &str,
            args: &[String],
            env: &Environment,
        ) -> Result<CapturedOutput, BridgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((program.to_string(), args.to_vec(), env.clone()));
            self.reply.clone()
        }
    }

    fn descriptor(value: serde_json::Value) -> CallDescriptor {
        serde_json::from_value(value).unwrap()
    }

    fn ok_bridge(status: ExitOutcome) -> ExecutionBridge<RecordingSpawner> {
        ExecutionBridge::with_spawner(RecordingSpawner::replying(Ok(CapturedOutput::new(
            "out", "err", status,
        ))))
    }

    #[test]
    fn empty_descriptor_never_spawns() {
        let bridge = ok_bridge(ExitOutcome::Exited(0));
        let result = bridge.execute(&descriptor(json!([])));

        assert_eq!(result.exit_code, 1);
        assert_eq!(result.error.as_deref(), Some("command array is empty"));
        assert!(result.stdout.is_empty() && result.stderr.is_empty());
        assert_eq!(bridge.spawner().calls(), 0);
    }

    #[test]
    fn non_string_element_never_spawns() {
        let bridge = ok_bridge(ExitOutcome::Exited(0));
        let result = bridge.execute(&descriptor(json!(["echo", "a", false])));

        assert_eq!(result.exit_code, 1);
        assert_eq!(result.error.as_deref(), Some("argument 2 is not a string"));
        assert_eq!(bridge.spawner().calls(), 0);
    }

    #[test]
    fn passes_program_args_and_inherited_env() {
        let bridge = ok_bridge(ExitOutcome::Exited(0));
        bridge.execute(&descriptor(json!(["git", "status", "--short"])));

        let last = bridge.spawner().last.lock().unwrap().clone().unwrap();
        assert_eq!(last.0, "git");
        assert_eq!(last.1, ["status", "--short"]);
        assert_eq!(last.2.len(), std::env::vars_os().count());
    }

    #[test]
    fn non_zero_exit_is_not_an_error() {
        let result = ok_bridge(ExitOutcome::Exited(3)).execute(&descriptor(json!(["x"])));
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.error, None);
        assert_eq!(result.stdout, "out");
        assert_eq!(result.stderr, "err");
    }

    #[test]
    fn spawn_failure_becomes_result() {
        let bridge = ExecutionBridge::with_spawner(RecordingSpawner::replying(Err(
            BridgeError::spawn_failed("ghost", "No such file or directory (os error 2)"),
        )));
        let result = bridge.execute(&descriptor(json!(["ghost"])));

        assert_eq!(result.exit_code, 1);
        assert!(result.error.unwrap().contains("No such file or directory"));
        assert!(result.stdout.is_empty() && result.stderr.is_empty());
        assert_eq!(bridge.spawner().calls(), 1);
    }

    #[test]
    fn signal_termination_becomes_error() {
        let result = ok_bridge(ExitOutcome::Signaled(15)).execute(&descriptor(json!(["x"])));
        assert_eq!(result.exit_code, 1);
        assert!(result.is_error());
    }
}
