//! Bridge to the external command-line assistant.
//!
//! The assistant is invoked non-interactively with JSON output:
//!
//! ```text
//! claude -p --output-format json [--model <model>] [extra args...]
//! ```
//!
//! The prompt is written to stdin and the process runs in the workspace
//! directory. Output is either a JSON object `{is_error?, result?}` or raw
//! text.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use composer_protocol::{ComposerDiagnostic, DiagnosticCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::stream::StreamGuard;

const EMPTY_RESPONSE: &str = "The assistant returned an empty response";

/// A single request to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantRequest {
    /// Working directory of the assistant process.
    pub cwd: PathBuf,
    pub prompt: String,
    pub model_override: Option<String>,
}

/// Errors reported by an assistant bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The requested model was rejected.
    #[error("{0}")]
    InvalidModel(String),

    /// The assistant needs the operator to sign in.
    #[error("{0}")]
    AuthRequired(String),

    /// Any other failure, including empty responses.
    #[error("{0}")]
    Unavailable(String),

    #[error("The assistant did not respond within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to start the assistant: {0}")]
    Spawn(#[source] std::io::Error),
}

impl BridgeError {
    /// Classifies an error message reported by the assistant.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("invalid_model") {
            Self::InvalidModel(message)
        } else if lower.contains("auth") || lower.contains("token") {
            Self::AuthRequired(message)
        } else {
            Self::Unavailable(message)
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::InvalidModel(_) => DiagnosticCode::CmdInvalidArgs,
            Self::AuthRequired(_) => DiagnosticCode::ProviderAuthRequired,
            Self::Unavailable(_) | Self::Timeout(_) | Self::Spawn(_) => {
                DiagnosticCode::ProviderUnavailable
            }
        }
    }

    pub fn to_diagnostic(&self) -> ComposerDiagnostic {
        ComposerDiagnostic::new(self.code(), self.to_string(), 0, 0)
    }
}

/// Sends prompts to an external assistant.
#[async_trait]
pub trait AssistantBridge: Send + Sync {
    /// Runs one request and returns the assistant's answer. Partial output may
    /// be forwarded through `stream`; the stream is closed by its owner.
    async fn run(
        &self,
        request: &AssistantRequest,
        stream: &StreamGuard,
    ) -> Result<String, BridgeError>;
}

#[derive(Debug, Deserialize)]
struct AssistantOutput {
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    result: Option<String>,
}

/// Interprets the output of a finished assistant process.
pub fn parse_output(success: bool, stdout: &str, stderr: &str) -> Result<String, BridgeError> {
    let stdout = stdout.trim();
    let stderr = stderr.trim();

    if let Ok(output) = serde_json::from_str::<AssistantOutput>(stdout) {
        let result = output.result.unwrap_or_default();
        if output.is_error || !success {
            let message = [result.trim(), stderr]
                .into_iter()
                .find(|m| !m.is_empty())
                .unwrap_or("The assistant reported an error");
            return Err(BridgeError::classify(message));
        }
        if result.trim().is_empty() {
            return Err(BridgeError::Unavailable(EMPTY_RESPONSE.to_string()));
        }
        return Ok(result);
    }

    if !success {
        let message = [stderr, stdout]
            .into_iter()
            .find(|m| !m.is_empty())
            .unwrap_or("The assistant exited with an error");
        return Err(BridgeError::classify(message));
    }
    if stdout.is_empty() {
        return Err(BridgeError::Unavailable(EMPTY_RESPONSE.to_string()));
    }
    Ok(stdout.to_string())
}

/// Runs the assistant as a child process.
#[derive(Debug, Clone)]
pub struct CliAssistantBridge {
    command: String,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl CliAssistantBridge {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
            timeout,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            command: config.command.clone(),
            extra_args: config.extra_args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Command-line arguments for a request.
    pub fn args(&self, model_override: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            "--output-format".to_string(),
            "json".to_string(),
        ];
        if let Some(model) = model_override.filter(|m| !m.trim().is_empty()) {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait]
impl AssistantBridge for CliAssistantBridge {
    async fn run(
        &self,
        request: &AssistantRequest,
        stream: &StreamGuard,
    ) -> Result<String, BridgeError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(self.args(request.model_override.as_deref()))
            .current_dir(&request.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Spawning assistant '{}' in {:?}", self.command, request.cwd);
        let mut child = cmd.spawn().map_err(BridgeError::Spawn)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let prompt = request.prompt.as_bytes();

        let result = tokio::time::timeout(self.timeout, async {
            let write = async {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(prompt).await?;
                    stdin.shutdown().await?;
                }
                Ok::<_, std::io::Error>(())
            };
            let (written, out, err) = tokio::join!(write, read_pipe(stdout), read_pipe(stderr));
            if let Err(e) = written {
                debug!("Assistant closed stdin early: {}", e);
            }
            let status = child.wait().await?;
            Ok::<(ExitStatus, String, String), std::io::Error>((status, out, err))
        })
        .await;

        let (status, out, err) = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Assistant process failed: {}", e);
                return Err(BridgeError::Unavailable(format!("The assistant process failed: {e}")));
            }
            Err(_) => {
                warn!("Assistant timed out after {:?}, killing it", self.timeout);
                let _ = child.kill().await;
                return Err(BridgeError::Timeout(self.timeout));
            }
        };

        let text = parse_output(status.success(), &out, &err).inspect_err(|e| {
            warn!("Assistant returned an error ({}): {}", status, e);
        })?;

        for line in text.split_inclusive('\n') {
            stream.chunk(line);
        }
        Ok(text)
    }
}
