//! Composer Protocol - data model for the composer input pipeline.
//!
//! These types travel between the UI layer and the pipeline: command
//! definitions, tokens, mention references, diagnostics and the results of
//! the suggest / prepare / execute requests. All offsets are byte offsets
//! into the raw composer text.

pub mod commands;
pub mod diagnostics;
pub mod mentions;
pub mod requests;
pub mod results;
pub mod tokens;

// Re-exports
pub use commands::{
    CommandCategory, CommandDefinition, CommandInvocation, CommandSource, HandlerTier,
    UNBOUNDED_ARGS,
};
pub use diagnostics::{ComposerDiagnostic, DiagnosticCode, Severity};
pub use mentions::{
    McpPayload, MentionQuery, MentionRef, MentionSuggestion, MentionType, SuggestionKind,
};
pub use requests::{PrepareRequest, SuggestRequest};
pub use results::{
    ComposerExecutionResult, ComposerParseDraft, ComposerParseResult, ComposerSuggestResult,
    ExecutionAction, ExecutionProvider, SuggestContext, Suggestions,
};
pub use tokens::{ComposerToken, TokenKind};
