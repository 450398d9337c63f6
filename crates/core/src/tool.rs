//! The JSON envelope every tool call answers with.

use crate::executor::ExecOutput;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Result of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Whether the call achieved what it was asked to do.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Tool-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Raw error detail when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    /// A successful response.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// A failed response.
    #[must_use]
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Reports a finished command. A non-zero exit becomes a failure
    /// carrying the command output as its error.
    #[must_use]
    pub fn from_exec(command: &str, output: &ExecOutput) -> Self {
        let data = json!({
            "command": command,
            "exitCode": output.exit_code,
            "output": output.combined_output,
        });

        if output.success {
            Self::ok(format!("Ran `{command}`")).with_data(data)
        } else {
            let code = output
                .exit_code
                .map_or_else(|| "unknown".to_string(), |code| code.to_string());
            Self::failure(
                format!("`{command}` failed with exit code {code}"),
                output.combined_output.trim_end(),
            )
            .with_data(data)
        }
    }

    /// Reports an error that stopped the call.
    ///
    /// The message is the error itself; the detail adds the diagnostic code,
    /// the chain of causes and the help text.
    #[must_use]
    pub fn from_diagnostic(diagnostic: &dyn Diagnostic) -> Self {
        let mut detail = Vec::new();
        if let Some(code) = diagnostic.code() {
            detail.push(code.to_string());
        }
        let mut source = diagnostic.source();
        while let Some(cause) = source {
            detail.push(cause.to_string());
            source = cause.source();
        }
        if let Some(help) = diagnostic.help() {
            detail.push(format!("help: {help}"));
        }
        Self::failure(diagnostic.to_string(), detail.join(": "))
    }

    /// Serializes to a single line of JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
