//! Custom error types for the bridge and its host.
//!
//! Each error type implements Display, Debug, Clone, PartialEq, Eq, and std::error::Error.
//!
//! No external error crates (anyhow, thiserror, eyre) are used.

use std::fmt;

/// Errors produced while turning a call descriptor into a finished process.
///
/// These never cross the script boundary as faults: the bridge converts every
/// one of them into an [`ExecutionResult`](crate::bridge::ExecutionResult)
/// whose `error` field is this error's `Display` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError {
    /// The specific error that occurred
    pub kind: BridgeErrorKind,
}

/// Specific bridge error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeErrorKind {
    /// The message carried a command that was not an array at all
    NotAnArray,
    /// The descriptor contained no elements
    EmptyCommand,
    /// An element of the descriptor was not a string
    NonStringArgument {
        /// Position of the first offending element
        index: usize,
    },
    /// The process could not be started (not found, not executable, OS refusal)
    SpawnFailed {
        /// The program that was requested
        program: String,
        /// Underlying failure text
        reason: String,
    },
    /// The process ended without a retrievable exit status
    AbnormalTermination {
        /// The program that was running
        program: String,
        /// What happened instead of a normal exit
        reason: String,
    },
}

impl BridgeError {
    /// Creates a new BridgeError with the given kind.
    #[must_use]
    pub fn new(kind: BridgeErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an error for a command that is not an array.
    #[must_use]
    pub fn not_an_array() -> Self {
        Self::new(BridgeErrorKind::NotAnArray)
    }

    /// Creates an empty command error.
    #[must_use]
    pub fn empty_command() -> Self {
        Self::new(BridgeErrorKind::EmptyCommand)
    }

    /// Creates a non-string argument error for the element at `index`.
    #[must_use]
    pub fn non_string_argument(index: usize) -> Self {
        Self::new(BridgeErrorKind::NonStringArgument { index })
    }

    /// Creates a spawn failed error.
    #[must_use]
    pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::SpawnFailed {
            program: program.into(),
            reason: reason.into(),
        })
    }

    /// Creates an abnormal termination error.
    #[must_use]
    pub fn abnormal_termination(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::AbnormalTermination {
            program: program.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if the request was rejected before any process was spawned.
    #[must_use]
    pub fn is_malformed_request(&self) -> bool {
        matches!(
            self.kind,
            BridgeErrorKind::NotAnArray
                | BridgeErrorKind::EmptyCommand
                | BridgeErrorKind::NonStringArgument { .. }
        )
    }

    /// Returns true if the process could not be started.
    #[must_use]
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self.kind, BridgeErrorKind::SpawnFailed { .. })
    }

    /// Returns true if the process ran but ended without an exit status.
    #[must_use]
    pub fn is_abnormal_termination(&self) -> bool {
        matches!(self.kind, BridgeErrorKind::AbnormalTermination { .. })
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BridgeErrorKind::NotAnArray => write!(f, "command must be an array"),
            BridgeErrorKind::EmptyCommand => write!(f, "command array is empty"),
            BridgeErrorKind::NonStringArgument { index } => {
                write!(f, "argument {} is not a string", index)
            }
            BridgeErrorKind::SpawnFailed { program, reason } => {
                write!(f, "failed to start '{}': {}", program, reason)
            }
            BridgeErrorKind::AbnormalTermination { program, reason } => {
                write!(f, "'{}' did not exit normally: {}", program, reason)
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Errors raised by the layers around the bridge: configuration, the
/// message protocol, and host I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    /// The specific error that occurred
    pub kind: HostErrorKind,
}

/// Specific host error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostErrorKind {
    /// Configuration could not be read or parsed
    Configuration {
        /// Which setting or source was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
    /// An inbound message could not be routed to the bridge
    Protocol {
        /// What was wrong with the message
        reason: String,
    },
    /// Reading requests or writing responses failed
    Io {
        /// The operation that failed
        operation: String,
        /// Underlying failure text
        reason: String,
    },
}

impl HostError {
    /// Creates a new HostError with the given kind.
    #[must_use]
    pub fn new(kind: HostErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Protocol {
            reason: reason.into(),
        })
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Io {
            operation: operation.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, HostErrorKind::Configuration { .. })
    }

    /// Returns true if this is a protocol error.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self.kind, HostErrorKind::Protocol { .. })
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            HostErrorKind::Configuration { field, reason } => {
                write!(f, "invalid configuration for '{}': {}", field, reason)
            }
            HostErrorKind::Protocol { reason } => {
                write!(f, "malformed request: {}; expected {{\"id\": string, \"command\": array}}", reason)
            }
            HostErrorKind::Io { operation, reason } => {
                write!(f, "{} failed: {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for HostError {}
