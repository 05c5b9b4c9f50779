//! Structured, non-throwing diagnostics attached to spans of composer input.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Closed set of diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    CmdUnknown,
    CmdInvalidArgs,
    CmdUnsupportedFlag,
    MentionUnresolved,
    MentionOutsideWorkspace,
    ParseSyntax,
    ProviderUnavailable,
    ProviderAuthRequired,
}

impl DiagnosticCode {
    /// Whether diagnostics with this code prevent execution.
    pub fn is_blocking(&self) -> bool {
        match self {
            Self::CmdUnknown
            | Self::CmdInvalidArgs
            | Self::CmdUnsupportedFlag
            | Self::MentionUnresolved
            | Self::MentionOutsideWorkspace
            | Self::ParseSyntax => true,
            Self::ProviderUnavailable | Self::ProviderAuthRequired => false,
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic for a span of the composer input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerDiagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub start: usize,
    pub end: usize,
    pub blocking: bool,
}

impl ComposerDiagnostic {
    /// Creates a diagnostic whose severity and blocking flag follow the code.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, start: usize, end: usize) -> Self {
        let blocking = code.is_blocking();
        Self {
            code,
            severity: if blocking {
                Severity::Error
            } else {
                Severity::Warning
            },
            message: message.into(),
            start,
            end,
            blocking,
        }
    }

    pub fn unknown_command(name: &str, start: usize, end: usize) -> Self {
        Self::new(
            DiagnosticCode::CmdUnknown,
            format!("Unknown command: /{name}"),
            start,
            end,
        )
    }

    pub fn invalid_args(syntax: &str, start: usize, end: usize) -> Self {
        Self::new(
            DiagnosticCode::CmdInvalidArgs,
            format!("Invalid arguments. Usage: {syntax}"),
            start,
            end,
        )
    }

    pub fn unsupported_flag(name: &str, flag: &str, start: usize, end: usize) -> Self {
        Self::new(
            DiagnosticCode::CmdUnsupportedFlag,
            format!("/{name} does not accept flags (got {flag})"),
            start,
            end,
        )
    }

    pub fn mention_unresolved(query: &str, start: usize, end: usize) -> Self {
        Self::new(
            DiagnosticCode::MentionUnresolved,
            format!("Could not resolve @{query}"),
            start,
            end,
        )
    }

    pub fn mention_outside_workspace(query: &str, start: usize, end: usize) -> Self {
        Self::new(
            DiagnosticCode::MentionOutsideWorkspace,
            format!("@{query} points outside the workspace"),
            start,
            end,
        )
    }

    pub fn no_workspace(len: usize) -> Self {
        Self::new(
            DiagnosticCode::ParseSyntax,
            "No active workspace. Select a workspace before sending.",
            0,
            len,
        )
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::new(DiagnosticCode::ProviderUnavailable, message, 0, 0)
    }

    pub fn provider_auth_required(message: impl Into<String>) -> Self {
        Self::new(DiagnosticCode::ProviderAuthRequired, message, 0, 0)
    }
}
