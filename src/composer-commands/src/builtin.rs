//! Built-in command catalogue.
//!
//! Built-in names are reserved: custom commands discovered from skills can
//! never shadow them.

use std::sync::LazyLock;

use composer_protocol::{CommandCategory, CommandDefinition, HandlerTier, UNBOUNDED_ARGS};

/// Commands answered entirely inside the shell, whatever their declared tier.
pub const LOCAL_COMMANDS: &[&str] = &["help", "clear", "model", "theme", "vim", "copy", "exit"];

static BUILTINS: LazyLock<Vec<CommandDefinition>> = LazyLock::new(build_catalogue);

/// Returns the immutable built-in catalogue.
pub fn builtin_commands() -> &'static [CommandDefinition] {
    &BUILTINS
}

/// Returns true if `name` is a reserved built-in name.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|def| def.name == name)
}

fn build_catalogue() -> Vec<CommandDefinition> {
    use CommandCategory::{Config, Context, Diagnostics, Integration, Session, Workflow};
    use HandlerTier::{CliProxy, Local};

    let def = CommandDefinition::builtin;

    vec![
        // ========================================
        // SESSION COMMANDS
        // ========================================
        def("help", "/help [command]", "Show available commands", Session, Local, 0, 1, false),
        def("clear", "/clear", "Clear the conversation and composer", Session, Local, 0, 0, false),
        def("exit", "/exit", "Close the current session", Session, Local, 0, 0, false),
        def(
            "compact",
            "/compact [instructions]",
            "Summarize the conversation to free up context",
            Session,
            CliProxy,
            0,
            UNBOUNDED_ARGS,
            false,
        ),
        def(
            "resume",
            "/resume [thread]",
            "Resume a previous conversation",
            Session,
            HandlerTier::Session,
            0,
            1,
            false,
        ),
        def(
            "rewind",
            "/rewind",
            "Rewind the conversation to an earlier turn",
            Session,
            HandlerTier::Session,
            0,
            0,
            false,
        ),
        def(
            "export",
            "/export [file]",
            "Export the conversation to a file",
            Session,
            HandlerTier::Session,
            0,
            1,
            false,
        ),
        def(
            "copy",
            "/copy",
            "Copy the last response to the clipboard",
            Session,
            Local,
            0,
            0,
            false,
        ),
        // ========================================
        // CONTEXT COMMANDS
        // ========================================
        def(
            "context",
            "/context",
            "Show what is in the assistant's context",
            Context,
            CliProxy,
            0,
            0,
            false,
        ),
        def(
            "memory",
            "/memory [note]",
            "Edit project memory files",
            Context,
            CliProxy,
            0,
            UNBOUNDED_ARGS,
            false,
        ),
        def(
            "add-dir",
            "/add-dir <path>",
            "Add a working directory",
            Context,
            CliProxy,
            1,
            1,
            false,
        ),
        def(
            "todos",
            "/todos",
            "List the current task list",
            Context,
            HandlerTier::Session,
            0,
            0,
            false,
        ),
        // ========================================
        // WORKFLOW COMMANDS
        // ========================================
        def(
            "init",
            "/init",
            "Initialize project instructions for the assistant",
            Workflow,
            CliProxy,
            0,
            0,
            false,
        ),
        def(
            "review",
            "/review [target]",
            "Review code changes for bugs and risks",
            Workflow,
            CliProxy,
            0,
            UNBOUNDED_ARGS,
            true,
        ),
        def(
            "security-review",
            "/security-review [target]",
            "Review pending changes for security issues",
            Workflow,
            CliProxy,
            0,
            UNBOUNDED_ARGS,
            true,
        ),
        def(
            "pr-comments",
            "/pr-comments [pr]",
            "Fetch and address pull request comments",
            Workflow,
            CliProxy,
            0,
            1,
            false,
        ),
        def("agents", "/agents", "Manage subagent configurations", Workflow, CliProxy, 0, 0, false),
        def(
            "plan",
            "/plan [goal]",
            "Draft a plan before making changes",
            Workflow,
            HandlerTier::Session,
            0,
            UNBOUNDED_ARGS,
            false,
        ),
        // ========================================
        // CONFIG COMMANDS
        // ========================================
        def(
            "model",
            "/model [name]",
            "Show or switch the assistant model",
            Config,
            Local,
            0,
            1,
            false,
        ),
        def("theme", "/theme [name]", "Change the color theme", Config, Local, 0, 1, false),
        def("vim", "/vim", "Toggle vim editing mode", Config, Local, 0, 0, false),
        def("config", "/config", "Open the settings panel", Config, Local, 0, 0, false),
        def(
            "permissions",
            "/permissions",
            "Show tool permission rules",
            Config,
            CliProxy,
            0,
            0,
            false,
        ),
        def(
            "output-style",
            "/output-style [style]",
            "Set the response output style",
            Config,
            CliProxy,
            0,
            1,
            false,
        ),
        def(
            "statusline",
            "/statusline [format]",
            "Configure the status line",
            Config,
            CliProxy,
            0,
            16,
            false,
        ),
        def(
            "terminal-setup",
            "/terminal-setup",
            "Install terminal key bindings",
            Config,
            Local,
            0,
            0,
            false,
        ),
        // ========================================
        // DIAGNOSTICS COMMANDS
        // ========================================
        def(
            "status",
            "/status",
            "Show session, model and account status",
            Diagnostics,
            CliProxy,
            0,
            0,
            false,
        ),
        def(
            "cost",
            "/cost",
            "Show token usage and cost for this session",
            Diagnostics,
            HandlerTier::Session,
            0,
            0,
            false,
        ),
        def("usage", "/usage", "Show plan usage limits", Diagnostics, CliProxy, 0, 0, false),
        def(
            "doctor",
            "/doctor",
            "Check the health of the installation",
            Diagnostics,
            CliProxy,
            0,
            0,
            false,
        ),
        def(
            "bug",
            "/bug [description]",
            "Report a problem",
            Diagnostics,
            CliProxy,
            0,
            UNBOUNDED_ARGS,
            false,
        ),
        def(
            "release-notes",
            "/release-notes",
            "Show release notes",
            Diagnostics,
            CliProxy,
            0,
            0,
            false,
        ),
        // ========================================
        // INTEGRATION COMMANDS
        // ========================================
        def(
            "mcp",
            "/mcp [server]",
            "Manage MCP server connections",
            Integration,
            CliProxy,
            0,
            2,
            false,
        ),
        def("ide", "/ide", "Connect to an IDE integration", Integration, CliProxy, 0, 0, false),
        def("hooks", "/hooks", "Manage tool event hooks", Integration, CliProxy, 0, 0, false),
        def("login", "/login", "Sign in to the assistant", Integration, CliProxy, 0, 0, false),
        def("logout", "/logout", "Sign out of the assistant", Integration, CliProxy, 0, 0, false),
        def(
            "install-github-app",
            "/install-github-app",
            "Set up the GitHub integration",
            Integration,
            CliProxy,
            0,
            0,
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalogue_size() {
        assert!(builtin_commands().len() >= 30);
    }

    #[test]
    fn test_catalogue_is_consistent() {
        let mut seen = HashSet::new();
        for def in builtin_commands() {
            assert!(def.is_valid(), "{} has invalid arity", def.name);
            assert!(seen.insert(def.name.as_str()), "duplicate {}", def.name);
            assert!(def.syntax.starts_with(&format!("/{}", def.name)));
        }
    }

    #[test]
    fn test_free_text_commands_are_unbounded() {
        for name in ["compact", "memory", "plan", "bug", "review", "security-review"] {
            let def = builtin_commands().iter().find(|d| d.name == name).unwrap();
            assert_eq!(def.max_args, UNBOUNDED_ARGS, "{name}");
            assert!(def.accepts_arg_count(200));
        }
    }

    #[test]
    fn test_local_commands_are_registered() {
        for name in LOCAL_COMMANDS {
            assert!(is_builtin(name), "{name} missing");
        }
    }

    #[test]
    fn test_every_category_but_custom_is_used() {
        for category in CommandCategory::all() {
            let used = builtin_commands().iter().any(|d| d.category == *category);
            assert_eq!(used, *category != CommandCategory::Custom, "{category}");
        }
    }
}
