//! Execution routing.
//!
//! A validated request is either answered locally or forwarded to the
//! external assistant. Forwarded requests are flattened into one prompt: an
//! instruction line for the command, the referenced context, then the
//! operator's text.

use composer_commands::{CommandRegistry, LOCAL_COMMANDS};
use composer_protocol::{
    CommandDefinition, CommandInvocation, CommandSource, ComposerExecutionResult,
    ComposerParseResult, ExecutionAction, HandlerTier,
};

/// Where a request is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Local,
    Assistant,
}

/// Picks the route for a parsed request.
///
/// Plain text (no command) always goes to the assistant.
pub fn route(command: Option<&CommandDefinition>) -> Route {
    let Some(def) = command else {
        return Route::Assistant;
    };
    if LOCAL_COMMANDS.contains(&def.name.as_str()) {
        return Route::Local;
    }
    match def.handler {
        HandlerTier::Local => Route::Local,
        HandlerTier::CliProxy | HandlerTier::Session | HandlerTier::Custom => Route::Assistant,
    }
}

// ============================================================
// PROMPT
// ============================================================

/// Instruction line for a proxied built-in command.
pub fn instruction_for(name: &str) -> Option<&'static str> {
    let line = match name {
        "compact" => concat!(
            "Respond concisely. Summarize the conversation so far, ",
            "keeping decisions, open tasks and file names."
        ),
        "review" => concat!(
            "Perform a review-style response: look for bugs, risky changes ",
            "and missing tests, and cite file locations."
        ),
        "security-review" => concat!(
            "Perform a security review of the pending changes. ",
            "Report concrete vulnerabilities with their locations."
        ),
        "init" => {
            "Analyze this repository and write concise project instructions for future sessions."
        }
        "context" => "Describe what is currently in your context.",
        "memory" => "Update the project memory with the following note.",
        "add-dir" => "Treat the following directory as an additional working directory.",
        "pr-comments" => "Fetch the comments on the pull request and address each of them.",
        "plan" => "Draft a step-by-step plan before making any changes. Do not edit files yet.",
        "bug" => "Help the operator write a clear bug report from the following description.",
        "resume" => "Resume the previous conversation.",
        "todos" => "List the current task list.",
        "cost" => "Report token usage and cost for this session.",
        _ => return None,
    };
    Some(line)
}

fn command_instruction(def: &CommandDefinition) -> String {
    match def.source {
        CommandSource::Skill => match &def.source_path {
            Some(path) => format!("Use the \"{}\" skill ({}).", def.name, path.display()),
            None => format!("Use the \"{}\" skill.", def.name),
        },
        CommandSource::Builtin => instruction_for(&def.name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Respond to the /{} command.", def.name)),
    }
}

/// Strips a leading `/name` from the normalized prompt.
fn free_text<'a>(parse: &'a ComposerParseResult) -> &'a str {
    let prompt = parse.normalized_prompt.as_str();
    let Some(command) = &parse.command else {
        return prompt;
    };
    match prompt.strip_prefix('/') {
        Some(rest) => {
            let name_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            if rest[..name_len].eq_ignore_ascii_case(&command.name) {
                rest[name_len..].trim()
            } else {
                prompt
            }
        }
        None => prompt,
    }
}

/// Builds the prompt sent to the assistant. Empty when there is nothing to
/// send.
pub fn build_prompt(parse: &ComposerParseResult, command: Option<&CommandDefinition>) -> String {
    let mut sections = Vec::new();

    if let Some(def) = command {
        sections.push(command_instruction(def));
    }

    if !parse.mentions.is_empty() {
        let mut context = String::from("Referenced context:");
        for mention in &parse.mentions {
            context.push_str("\n- ");
            context.push_str(mention.prompt_label());
        }
        sections.push(context);
    }

    let text = free_text(parse);
    if !text.is_empty() {
        sections.push(text.to_string());
    }

    sections.join("\n\n")
}

// ============================================================
// LOCAL COMMANDS
// ============================================================

fn help_text(registry: &CommandRegistry, topic: Option<&str>) -> String {
    if let Some(topic) = topic {
        let name = topic.trim_start_matches('/').to_lowercase();
        return match registry.get(&name) {
            Some(def) => format!("{}\n  {}", def.syntax, def.description),
            None => format!("Unknown command: /{name}"),
        };
    }

    let mut out = String::from("Available commands:");
    for def in registry.list() {
        out.push_str(&format!("\n  {:<24} {}", def.syntax, def.description));
    }
    out
}

/// Answers a command that never leaves the shell.
///
/// `current_model` is the caller's model override, reported by `/model`
/// without an argument.
pub fn local_response(
    invocation: &CommandInvocation,
    registry: &CommandRegistry,
    current_model: Option<&str>,
) -> ComposerExecutionResult {
    let arg = invocation.args.first().map(String::as_str);

    match invocation.name.as_str() {
        "help" => ComposerExecutionResult::local(help_text(registry, arg)),
        "clear" => ComposerExecutionResult::local("Conversation cleared.")
            .with_action(ExecutionAction::Clear),
        "model" => match arg {
            Some(model) => ComposerExecutionResult::local(format!("Model set to {model}."))
                .with_model_override(Some(model.to_string())),
            None => ComposerExecutionResult::local(format!(
                "Current model: {}.",
                current_model.unwrap_or("default")
            )),
        },
        "theme" => match arg {
            Some(theme) => ComposerExecutionResult::local(format!("Theme set to {theme}.")),
            None => ComposerExecutionResult::local("Choose a theme in the appearance settings."),
        },
        "vim" => ComposerExecutionResult::local("Vim editing mode toggled."),
        "copy" => ComposerExecutionResult::local("Last response copied to the clipboard."),
        "exit" => ComposerExecutionResult::local("Session closed."),
        name => match registry.get(name) {
            Some(def) => ComposerExecutionResult::local(format!(
                "/{name} is handled by the shell. {}",
                def.description
            )),
            None => ComposerExecutionResult::local(format!("/{name} is handled by the shell.")),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use composer_protocol::{
        CommandCategory, ComposerParseDraft, MentionRef, MentionType,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn invocation(name: &str, args: &[&str]) -> CommandInvocation {
        CommandInvocation {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            raw: format!("/{name}"),
            start: 0,
            end: name.len() + 1,
        }
    }

    fn parse(
        prompt: &str,
        command: Option<CommandInvocation>,
        mentions: Vec<MentionRef>,
    ) -> ComposerParseResult {
        let draft = ComposerParseDraft {
            command,
            normalized_prompt: prompt.to_string(),
            ..Default::default()
        };
        ComposerParseResult::from_draft(prompt, draft, mentions, Vec::new())
    }

    fn file_ref(path: &str) -> MentionRef {
        MentionRef {
            id: format!("file:{path}"),
            mention_type: MentionType::File,
            workspace_id: "ws".to_string(),
            absolute_path: None,
            relative_path: Some(path.to_string()),
            display: path.to_string(),
            payload: None,
        }
    }

    #[test]
    fn test_route() {
        let registry = CommandRegistry::new();
        let get = |name: &str| registry.get(name);

        assert_eq!(route(None), Route::Assistant);
        assert_eq!(route(get("help").as_ref()), Route::Local);
        assert_eq!(route(get("config").as_ref()), Route::Local);
        assert_eq!(route(get("compact").as_ref()), Route::Assistant);
        assert_eq!(route(get("plan").as_ref()), Route::Assistant);

        let mut custom = CommandDefinition::builtin(
            "deploy",
            "/deploy",
            "Deploy",
            CommandCategory::Custom,
            HandlerTier::Custom,
            0,
            16,
            true,
        );
        custom.source = CommandSource::Skill;
        assert_eq!(route(Some(&custom)), Route::Assistant);
    }

    #[test]
    fn test_build_prompt_sections() {
        let registry = CommandRegistry::new();
        let def = registry.get("review");
        let parse = parse(
            "/review @src/lib.rs focus on errors",
            Some(invocation("review", &["@src/lib.rs", "focus", "on", "errors"])),
            vec![file_ref("src/lib.rs")],
        );

        let prompt = build_prompt(&parse, def.as_ref());
        let sections: Vec<&str> = prompt.split("\n\n").collect();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].starts_with("Perform a review-style response"));
        assert_eq!(sections[1], "Referenced context:\n- src/lib.rs");
        assert_eq!(sections[2], "@src/lib.rs focus on errors");
    }

    #[test]
    fn test_build_prompt_plain_and_empty() {
        let parse_plain = parse("explain this", None, Vec::new());
        assert_eq!(build_prompt(&parse_plain, None), "explain this");

        let parse_empty = parse("", None, Vec::new());
        assert_eq!(build_prompt(&parse_empty, None), "");
    }

    #[test]
    fn test_build_prompt_custom_skill() {
        let mut def = CommandDefinition::builtin(
            "deploy",
            "/deploy",
            "Deploy",
            CommandCategory::Custom,
            HandlerTier::Custom,
            0,
            16,
            true,
        );
        def.source = CommandSource::Skill;
        def.source_path = Some(PathBuf::from("/ws/.claude/skills/deploy/SKILL.md"));

        let parse = parse("/deploy", Some(invocation("deploy", &[])), Vec::new());
        assert_eq!(
            build_prompt(&parse, Some(&def)),
            "Use the \"deploy\" skill (/ws/.claude/skills/deploy/SKILL.md)."
        );
    }

    #[test]
    fn test_local_responses() {
        let registry = CommandRegistry::new();

        let result = local_response(&invocation("clear", &[]), &registry, None);
        assert_eq!(result.action, ExecutionAction::Clear);
        assert!(result.ok);

        let result = local_response(&invocation("model", &["opus"]), &registry, None);
        assert_eq!(result.model_override.as_deref(), Some("opus"));

        let result = local_response(&invocation("model", &[]), &registry, Some("sonnet"));
        assert_eq!(result.output, "Current model: sonnet.");
        assert_eq!(result.model_override, None);

        let result = local_response(&invocation("help", &["compact"]), &registry, None);
        assert!(result.output.starts_with("/compact"));

        let result = local_response(&invocation("help", &[]), &registry, None);
        assert!(result.output.contains("/mcp"));

        let result = local_response(&invocation("config", &[]), &registry, None);
        assert!(result.output.starts_with("/config is handled by the shell."));
    }
}
