//! Line-delimited host loop.
//!
//! Reads one JSON [`CommandRequest`] per line, runs each on its own blocking
//! task, and writes one response line per request as soon as it finishes.
//! Responses therefore arrive in completion order; the `id` field is what
//! ties them back to their requests.

use crate::bridge::ExecutionBridge;
use crate::error::HostError;
use crate::ipc::{self, CommandResponse, ScriptCallback};
use crate::spawn::{HostSpawner, ProcessSpawner};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// How responses are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResponseFormat {
    /// One [`CommandResponse`] JSON object per line.
    #[default]
    Json,
    /// One [`ScriptCallback`] statement per line, ready to evaluate in the
    /// script context.
    Script,
}

impl ResponseFormat {
    fn render(self, response: &CommandResponse) -> Result<String, HostError> {
        match self {
            Self::Json => response.to_line(),
            Self::Script => ScriptCallback::render(&response.id, &response.result),
        }
    }
}

/// Serves bridge requests over a pair of byte streams.
///
/// # Example
///
/// ```rust,no_run
/// use wizardry_bridge::host::LineHost;
///
/// # async fn run() -> Result<(), wizardry_bridge::error::HostError> {
/// let served = LineHost::new()
///     .serve(tokio::io::stdin(), tokio::io::stdout())
///     .await?;
/// eprintln!("served {served} requests");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LineHost<S = HostSpawner> {
    bridge: Arc<ExecutionBridge<S>>,
    format: ResponseFormat,
}

impl LineHost<HostSpawner> {
    /// Creates a host over a bridge that spawns real processes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bridge(ExecutionBridge::new())
    }
}

impl Default for LineHost<HostSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ProcessSpawner + 'static> LineHost<S> {
    /// Creates a host over the given bridge.
    #[must_use]
    pub fn with_bridge(bridge: ExecutionBridge<S>) -> Self {
        Self {
            bridge: Arc::new(bridge),
            format: ResponseFormat::default(),
        }
    }

    /// Sets the response format.
    #[must_use]
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns the response format.
    #[must_use]
    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Serves requests from `reader` until end of input.
    ///
    /// Blank lines are skipped. Lines that cannot be routed (not UTF-8, not
    /// JSON, or no string `id`) are logged and dropped. On end of input, waits for every
    /// in-flight request to finish and be written, then returns the number
    /// of requests served.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading input or writing a response fails.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<usize, HostError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<CommandResponse>();
        let format = self.format;

        let read_loop = async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            let mut served = 0usize;

            loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .await
                    .map_err(|e| HostError::io("read request", e.to_string()))?;
                if read == 0 {
                    break;
                }

                let Ok(line) = std::str::from_utf8(&buf) else {
                    tracing::warn!(len = buf.len(), "dropping message that is not valid UTF-8");
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let request = match ipc::parse_request(line) {
                    Ok(request) => request,
                    Err(error) => {
                        tracing::warn!(%error, "dropping unroutable message");
                        continue;
                    }
                };

                served += 1;
                tracing::debug!(request_id = %request.id, "dispatching request");

                let bridge = Arc::clone(&self.bridge);
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let response = ipc::respond(&bridge, request);
                    if tx.send(response).is_err() {
                        tracing::warn!("response writer closed before request finished");
                    }
                });
            }

            Ok::<usize, HostError>(served)
        };

        let write_loop = async {
            while let Some(response) = rx.recv().await {
                let mut line = format.render(&response)?;
                line.push('\n');
                writer
                    .write_all(line.as_bytes())
                    .await
                    .map_err(|e| HostError::io("write response", e.to_string()))?;
                writer
                    .flush()
                    .await
                    .map_err(|e| HostError::io("flush response", e.to_string()))?;
            }
            Ok::<(), HostError>(())
        };

        let (served, ()) = tokio::try_join!(read_loop, write_loop)?;
        tracing::info!(served, "input closed");
        Ok(served)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::spawn::{CapturedOutput, Environment, ExitOutcome};
    use serde_json::Value;
    use std::time::Duration;

    /// Sleeps for the number of milliseconds given as the first argument.
    #[derive(Debug)]
    struct Sleeper;

    impl ProcessSpawner for Sleeper {
        fn spawn_and_capture(
            &self,
            program: &str,
            args: &[String],
            _env: &Environment,
        ) -> Result<CapturedOutput, BridgeError> {
            let millis = args.first().and_then(|a| a.parse().ok()).unwrap_or(0);
            std::thread::sleep(Duration::from_millis(millis));
            Ok(CapturedOutput::new(program, "", ExitOutcome::Exited(0)))
        }
    }

    fn host() -> LineHost<Sleeper> {
        LineHost::with_bridge(ExecutionBridge::with_spawner(Sleeper))
    }

    fn response_lines(out: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn answers_each_request() {
        let input = b"{\"id\":\"a\",\"command\":[\"one\"]}\n{\"id\":\"b\",\"command\":[\"two\"]}\n";
        let mut out = Vec::new();

        let served = host().serve(&input[..], &mut out).await.unwrap();

        assert_eq!(served, 2);
        let mut lines = response_lines(&out);
        lines.sort_by(|x, y| x["id"].as_str().cmp(&y["id"].as_str()));
        assert_eq!(lines[0]["id"], "a");
        assert_eq!(lines[0]["result"]["stdout"], "one");
        assert_eq!(lines[1]["result"]["stdout"], "two");
    }

    #[tokio::test]
    async fn responses_follow_completion_order() {
        let input = concat!(
            "{\"id\":\"slow\",\"command\":[\"slow\",\"400\"]}\n",
            "{\"id\":\"fast\",\"command\":[\"fast\",\"0\"]}\n",
        );
        let mut out = Vec::new();

        host().serve(input.as_bytes(), &mut out).await.unwrap();

        let ids: Vec<_> = response_lines(&out)
            .iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["fast", "slow"]);
    }

    #[tokio::test]
    async fn skips_blank_and_unroutable_lines() {
        let input = "\n   \nnot json\n{\"command\":[\"x\"]}\n{\"id\":\"ok\",\"command\":[\"x\"]}\n";
        let mut out = Vec::new();

        let served = host().serve(input.as_bytes(), &mut out).await.unwrap();

        assert_eq!(served, 1);
        let lines = response_lines(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["id"], "ok");
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_dropped_without_stopping() {
        let mut input = b"{\"id\":\"a\",\"command\":[\"one\"]}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"id\":\"b\",\"command\":[\"two\"]}\n");
        let mut out = Vec::new();

        let served = host().serve(&input[..], &mut out).await.unwrap();

        assert_eq!(served, 2);
        let mut ids: Vec<_> = response_lines(&out)
            .iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn last_line_without_newline_is_served() {
        let input = "{\"id\":\"tail\",\"command\":[\"x\"]}";
        let mut out = Vec::new();

        let served = host().serve(input.as_bytes(), &mut out).await.unwrap();

        assert_eq!(served, 1);
        assert_eq!(response_lines(&out)[0]["id"], "tail");
    }

    #[tokio::test]
    async fn non_array_command_gets_error_response() {
        let input = "{\"id\":\"bad\",\"command\":\"ls\"}\n";
        let mut out = Vec::new();

        host().serve(input.as_bytes(), &mut out).await.unwrap();

        let lines = response_lines(&out);
        assert_eq!(lines[0]["result"]["error"], "command must be an array");
        assert_eq!(lines[0]["result"]["exitCode"], 1);
    }

    #[tokio::test]
    async fn empty_input_serves_nothing() {
        let mut out = Vec::new();
        let served = host().serve(&b""[..], &mut out).await.unwrap();
        assert_eq!(served, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn script_format_writes_callbacks() {
        let input = "{\"id\":\"cb\",\"command\":[\"hi\"]}\n";
        let mut out = Vec::new();

        host()
            .with_format(ResponseFormat::Script)
            .serve(input.as_bytes(), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("if (window.__wizardry_callbacks"));
        assert!(text.contains(r#"["cb"]({"stdout":"hi""#));
    }
}
