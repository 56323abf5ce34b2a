//! Message protocol between the script context and the host.
//!
//! A script posts `{"id": "...", "command": [...]}`. The host answers with a
//! [`CommandResponse`] carrying the same `id`, or with a [`ScriptCallback`]
//! snippet that resolves the pending promise registered under that id.

use crate::bridge::{CallDescriptor, DynamicValue, ExecutionBridge, ExecutionResult};
use crate::error::{BridgeError, HostError};
use crate::spawn::ProcessSpawner;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the global object holding pending script callbacks.
pub const CALLBACK_REGISTRY: &str = "window.__wizardry_callbacks";

/// One request from the script context.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandRequest {
    /// Correlates the response with the pending script promise.
    pub id: String,

    /// The call descriptor, still untyped. Missing is treated like `null`.
    #[serde(default)]
    pub command: Value,
}

impl CommandRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(id: impl Into<String>, command: Value) -> Self {
        Self {
            id: id.into(),
            command,
        }
    }

    /// Extracts the call descriptor.
    ///
    /// # Errors
    ///
    /// Returns `NotAnArray` if `command` is anything other than an array.
    pub fn descriptor(&self) -> Result<CallDescriptor, BridgeError> {
        match &self.command {
            Value::Array(items) => Ok(items.iter().cloned().map(DynamicValue::from).collect()),
            _ => Err(BridgeError::not_an_array()),
        }
    }
}

/// The answer to one [`CommandRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandResponse {
    /// The id of the request being answered.
    pub id: String,
    /// What happened.
    pub result: ExecutionResult,
}

impl CommandResponse {
    /// Encodes the response as a single JSON line, without the newline.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if serialization fails.
    pub fn to_line(&self) -> Result<String, HostError> {
        serde_json::to_string(self)
            .map_err(|e| HostError::io("encode response", e.to_string()))
    }
}

/// Parses one message from the script context.
///
/// A message that parses but whose `command` is not an array is still
/// routable and is answered with an error result by [`respond`].
///
/// # Errors
///
/// Returns a protocol error if the text is not JSON or lacks a string `id`.
pub fn parse_request(line: &str) -> Result<CommandRequest, HostError> {
    serde_json::from_str(line.trim()).map_err(|e| HostError::protocol(e.to_string()))
}

/// Runs a request through the bridge and pairs the result with its id.
pub fn respond<S: ProcessSpawner>(
    bridge: &ExecutionBridge<S>,
    request: CommandRequest,
) -> CommandResponse {
    let result = match request.descriptor() {
        Ok(descriptor) => bridge.execute(&descriptor),
        Err(error) => {
            tracing::warn!(
                request_id = %request.id,
                command = %request.command,
                %error,
                "rejecting request"
            );
            ExecutionResult::failure(&error)
        }
    };

    CommandResponse {
        id: request.id,
        result,
    }
}

/// Renders the script that delivers a result to a waiting callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptCallback;

impl ScriptCallback {
    /// Produces a statement that calls and then removes the callback
    /// registered under `id`, if it still exists.
    ///
    /// Both `id` and every string in `result` are JSON-escaped, with U+2028
    /// and U+2029 also escaped, so arbitrary process output is safe to embed
    /// in a script on any engine.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if serialization fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wizardry_bridge::bridge::ExecutionResult;
    /// use wizardry_bridge::ipc::ScriptCallback;
    ///
    /// let js = ScriptCallback::render("req-1", &ExecutionResult::exited("hi\n", "", 0))?;
    /// assert!(js.contains(r#"window.__wizardry_callbacks["req-1"]"#));
    /// # Ok::<(), wizardry_bridge::error::HostError>(())
    /// ```
    pub fn render(id: &str, result: &ExecutionResult) -> Result<String, HostError> {
        let key = serde_json::to_string(id)
            .map(escape_line_separators)
            .map_err(|e| HostError::io("encode callback id", e.to_string()))?;
        let payload = serde_json::to_string(result)
            .map(escape_line_separators)
            .map_err(|e| HostError::io("encode callback result", e.to_string()))?;
        let callback = format!("{CALLBACK_REGISTRY}[{key}]");

        Ok(format!(
            "if ({CALLBACK_REGISTRY} && {callback}) {{ {callback}({payload}); delete {callback}; }}"
        ))
    }
}

/// JSON allows raw U+2028 and U+2029 inside strings; older script engines
/// treat them as line terminators.
fn escape_line_separators(json: String) -> String {
    if json.contains(['\u{2028}', '\u{2029}']) {
        json.replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029")
    } else {
        json
    }
}
