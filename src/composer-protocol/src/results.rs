//! Results of the suggest / prepare / execute requests.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::commands::{CommandDefinition, CommandInvocation};
use crate::diagnostics::ComposerDiagnostic;
use crate::mentions::{MentionQuery, MentionRef, MentionSuggestion};
use crate::tokens::ComposerToken;

// ============================================================
// PARSE
// ============================================================

/// Output of the tokenizer before any mention is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerParseDraft {
    pub tokens: Vec<ComposerToken>,
    pub command: Option<CommandInvocation>,
    pub mention_queries: Vec<MentionQuery>,
    pub diagnostics: Vec<ComposerDiagnostic>,
    pub normalized_prompt: String,
}

/// Authoritative parse result consulted before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerParseResult {
    pub raw_input: String,
    pub tokens: Vec<ComposerToken>,
    pub command: Option<CommandInvocation>,
    pub mentions: Vec<MentionRef>,
    pub normalized_prompt: String,
    pub diagnostics: Vec<ComposerDiagnostic>,
    /// True if any diagnostic is blocking.
    pub blocking: bool,
}

impl ComposerParseResult {
    /// Builds a result from a draft, deriving `blocking` from the diagnostics.
    pub fn from_draft(
        raw_input: impl Into<String>,
        draft: ComposerParseDraft,
        mentions: Vec<MentionRef>,
        extra_diagnostics: Vec<ComposerDiagnostic>,
    ) -> Self {
        let mut diagnostics = draft.diagnostics;
        diagnostics.extend(extra_diagnostics);
        let blocking = diagnostics.iter().any(|d| d.blocking);
        Self {
            raw_input: raw_input.into(),
            tokens: draft.tokens,
            command: draft.command,
            mentions,
            normalized_prompt: draft.normalized_prompt,
            diagnostics,
            blocking,
        }
    }

    /// The first blocking diagnostic, if any.
    pub fn first_blocking(&self) -> Option<&ComposerDiagnostic> {
        self.diagnostics.iter().find(|d| d.blocking)
    }
}

// ============================================================
// SUGGEST
// ============================================================

/// What the cursor is currently completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SuggestContext {
    None,
    Command,
    Mention,
}

/// Ranked suggestions of a single kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "kebab-case")]
pub enum Suggestions {
    Commands(Vec<CommandDefinition>),
    Mentions(Vec<MentionSuggestion>),
}

impl Suggestions {
    pub fn len(&self) -> usize {
        match self {
            Self::Commands(items) => items.len(),
            Self::Mentions(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerSuggestResult {
    pub context: SuggestContext,
    pub query: String,
    pub suggestions: Suggestions,
}

impl ComposerSuggestResult {
    /// The empty result for plain text.
    pub fn none() -> Self {
        Self {
            context: SuggestContext::None,
            query: String::new(),
            suggestions: Suggestions::Commands(Vec::new()),
        }
    }
}

// ============================================================
// EXECUTE
// ============================================================

/// Who produced an execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExecutionProvider {
    Local,
    ExternalAssistant,
}

/// Side effect the caller applies after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExecutionAction {
    #[default]
    None,
    /// Reset composer and conversation state.
    Clear,
}

/// Result of an execution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerExecutionResult {
    pub ok: bool,
    pub provider: ExecutionProvider,
    pub output: String,
    pub action: ExecutionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<ComposerDiagnostic>>,
}

impl ComposerExecutionResult {
    /// A successful local result.
    pub fn local(output: impl Into<String>) -> Self {
        Self {
            ok: true,
            provider: ExecutionProvider::Local,
            output: output.into(),
            action: ExecutionAction::None,
            model_override: None,
            diagnostics: None,
        }
    }

    /// A successful result produced by the external assistant.
    pub fn assistant(output: impl Into<String>) -> Self {
        Self {
            provider: ExecutionProvider::ExternalAssistant,
            ..Self::local(output)
        }
    }

    /// A failed result carrying diagnostics; the first message becomes the output.
    pub fn failed(provider: ExecutionProvider, diagnostics: Vec<ComposerDiagnostic>) -> Self {
        let output = diagnostics
            .first()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "Execution failed".to_string());
        Self {
            ok: false,
            provider,
            output,
            action: ExecutionAction::None,
            model_override: None,
            diagnostics: Some(diagnostics),
        }
    }

    pub fn with_action(mut self, action: ExecutionAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }
}
