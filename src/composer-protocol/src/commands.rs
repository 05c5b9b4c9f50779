//! Slash-command definitions and invocations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

// ============================================================
// COMMAND CATEGORY
// ============================================================

/// Category used to group commands in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommandCategory {
    /// Conversation lifecycle (clear, compact, resume, ...).
    Session,
    /// What the assistant can see (context, memory, add-dir, ...).
    Context,
    /// Development workflows (review, init, pr-comments, ...).
    Workflow,
    /// Shell configuration (model, theme, vim, ...).
    Config,
    /// Health and usage information (doctor, status, cost, ...).
    Diagnostics,
    /// External integrations (mcp, ide, hooks, ...).
    Integration,
    /// Commands discovered from skill documents.
    Custom,
}

impl CommandCategory {
    /// Returns all categories in display order.
    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Session,
            CommandCategory::Context,
            CommandCategory::Workflow,
            CommandCategory::Config,
            CommandCategory::Diagnostics,
            CommandCategory::Integration,
            CommandCategory::Custom,
        ]
    }
}

// ============================================================
// HANDLER TIER
// ============================================================

/// Execution strategy a command is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HandlerTier {
    /// Answered synchronously inside the shell.
    Local,
    /// Forwarded to the external assistant process.
    CliProxy,
    /// Needs the conversation state of the external assistant.
    Session,
    /// A discovered skill, forwarded with its skill reference.
    Custom,
}

/// Where a command definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommandSource {
    Builtin,
    Skill,
}

// ============================================================
// COMMAND DEFINITION
// ============================================================

/// `max_args` of commands whose arguments are free text.
pub const UNBOUNDED_ARGS: usize = usize::MAX;

/// A registered slash command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDefinition {
    /// Unique command name, without the leading `/`.
    pub name: String,
    /// Display syntax, e.g. `/model <name>`.
    pub syntax: String,
    /// One-line description.
    pub description: String,
    pub category: CommandCategory,
    pub handler: HandlerTier,
    pub min_args: usize,
    pub max_args: usize,
    /// Whether `-`-prefixed arguments are accepted.
    pub allow_flags: bool,
    pub source: CommandSource,
    /// Document the command was loaded from (skills only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl CommandDefinition {
    /// Creates a built-in definition.
    #[allow(clippy::too_many_arguments)]
    pub fn builtin(
        name: &str,
        syntax: &str,
        description: &str,
        category: CommandCategory,
        handler: HandlerTier,
        min_args: usize,
        max_args: usize,
        allow_flags: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            syntax: syntax.to_string(),
            description: description.to_string(),
            category,
            handler,
            min_args,
            max_args,
            allow_flags,
            source: CommandSource::Builtin,
            source_path: None,
        }
    }

    /// Returns true if the argument bounds are consistent.
    pub fn is_valid(&self) -> bool {
        self.min_args <= self.max_args && !self.name.is_empty()
    }

    /// Returns true if `count` arguments satisfy the arity rule.
    pub fn accepts_arg_count(&self, count: usize) -> bool {
        count >= self.min_args && count <= self.max_args
    }
}

// ============================================================
// COMMAND INVOCATION
// ============================================================

/// The leading slash-command of a composer input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInvocation {
    /// Name as typed, without the leading `/`.
    pub name: String,
    /// Arguments after quote processing.
    pub args: Vec<String>,
    /// Raw text of the whole command, from `/` through the last argument.
    pub raw: String,
    pub start: usize,
    pub end: usize,
}

impl CommandInvocation {
    /// Returns the arguments that look like flags.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .map(String::as_str)
            .filter(|arg| arg.starts_with('-') && arg.len() > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_serializes_kebab_case() {
        let json = serde_json::to_string(&HandlerTier::CliProxy).unwrap();
        assert_eq!(json, "\"cli-proxy\"");
        assert_eq!(HandlerTier::CliProxy.to_string(), "cli-proxy");
    }

    #[test]
    fn test_definition_arity() {
        let def = CommandDefinition::builtin(
            "model",
            "/model [name]",
            "Switch model",
            CommandCategory::Config,
            HandlerTier::Local,
            0,
            1,
            false,
        );
        assert!(def.is_valid());
        assert!(def.accepts_arg_count(0));
        assert!(def.accepts_arg_count(1));
        assert!(!def.accepts_arg_count(2));
    }

    #[test]
    fn test_invocation_flags() {
        let invocation = CommandInvocation {
            name: "review".to_string(),
            args: vec!["--fast".to_string(), "src".to_string(), "-".to_string()],
            raw: "/review".to_string(),
            start: 0,
            end: 7,
        };
        let flags: Vec<_> = invocation.flags().collect();
        assert_eq!(flags, vec!["--fast"]);
    }
}
