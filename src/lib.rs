//! # Wizardry Bridge: host command execution for script contexts
//!
//! Lets an embedded script context (a web view, a plugin runtime) run host
//! commands and get back everything it needs to decide what happened.
//!
//! ## Architecture
//!
//! - **Bridge**: validates an untyped call descriptor and turns it into one
//!   process run, folding every failure into the result record
//! - **Spawn**: the process-spawn capability and its OS-backed implementation
//! - **IPC**: the `{id, command}` message protocol and script callbacks
//! - **Host**: a concurrent line-delimited server over any async byte streams
//! - **Config / Logging**: TOML configuration and file-based tracing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wizardry_bridge::prelude::*;
//!
//! let bridge = ExecutionBridge::new();
//! let result = bridge.execute(&CallDescriptor::from_strings(["uname", "-s"]));
//!
//! if let Some(error) = &result.error {
//!     eprintln!("could not run: {error}");
//! } else {
//!     println!("exit {}: {}", result.exit_code, result.stdout);
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod ipc;
pub mod logging;
pub mod spawn;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bridge::{
        ArgumentVector, CallDescriptor, DynamicValue, ExecutionBridge, ExecutionResult,
    };
    pub use crate::config::BridgeConfig;
    pub use crate::error::{BridgeError, BridgeErrorKind, HostError, HostErrorKind};
    pub use crate::host::{LineHost, ResponseFormat};
    pub use crate::ipc::{CommandRequest, CommandResponse, ScriptCallback};
    pub use crate::spawn::{CapturedOutput, Environment, ExitOutcome, HostSpawner, ProcessSpawner};
    pub use crate::types::InvocationId;
}
