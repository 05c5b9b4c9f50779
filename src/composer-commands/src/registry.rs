//! Command registry: built-ins plus a replaceable set of custom commands.

use std::sync::Arc;

use composer_protocol::CommandDefinition;
use parking_lot::RwLock;
use tracing::debug;

use crate::builtin::{builtin_commands, is_builtin};

/// Registry of slash commands.
///
/// Built-ins are fixed for the lifetime of the process. Custom commands are
/// replaced wholesale by [`CommandRegistry::replace_custom`], so definitions
/// discovered for one workspace never survive a switch to another.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    custom: RwLock<Arc<Vec<CommandDefinition>>>,
}

impl CommandRegistry {
    /// Creates a registry with no custom commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `commands` as its custom set.
    pub fn with_custom(commands: Vec<CommandDefinition>) -> Self {
        let registry = Self::new();
        registry.replace_custom(commands);
        registry
    }

    /// Gets a command by name. Built-ins win over custom commands.
    pub fn get(&self, name: &str) -> Option<CommandDefinition> {
        if let Some(def) = builtin_commands().iter().find(|def| def.name == name) {
            return Some(def.clone());
        }

        self.custom
            .read()
            .iter()
            .find(|def| def.name == name)
            .cloned()
    }

    /// Checks if a command exists.
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Lists built-ins followed by custom commands.
    pub fn list(&self) -> Vec<CommandDefinition> {
        let custom = self.custom_snapshot();
        builtin_commands()
            .iter()
            .chain(custom.iter())
            .cloned()
            .collect()
    }

    /// Commands whose name starts with `prefix`, case-insensitively.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<CommandDefinition> {
        let prefix_lower = prefix.to_lowercase();
        self.list()
            .into_iter()
            .filter(|def| def.name.to_lowercase().starts_with(&prefix_lower))
            .collect()
    }

    /// The current custom command set.
    pub fn custom_snapshot(&self) -> Arc<Vec<CommandDefinition>> {
        Arc::clone(&self.custom.read())
    }

    /// Atomically replaces the custom command set.
    ///
    /// Definitions that collide with a built-in, or repeat an earlier custom
    /// name, are dropped.
    pub fn replace_custom(&self, commands: Vec<CommandDefinition>) {
        let mut kept: Vec<CommandDefinition> = Vec::with_capacity(commands.len());
        for def in commands {
            if is_builtin(&def.name) {
                debug!("Dropping custom command '{}': reserved built-in name", def.name);
                continue;
            }
            if kept.iter().any(|k| k.name == def.name) {
                debug!("Dropping duplicate custom command '{}'", def.name);
                continue;
            }
            if !def.is_valid() {
                debug!("Dropping custom command '{}': invalid arity", def.name);
                continue;
            }
            kept.push(def);
        }

        *self.custom.write() = Arc::new(kept);
    }

    /// Makes `other`'s custom set the current one, sharing the same `Arc`.
    pub fn adopt_custom(&self, other: &CommandRegistry) {
        *self.custom.write() = other.custom_snapshot();
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        builtin_commands().len() + self.custom.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use composer_protocol::{CommandCategory, CommandSource, HandlerTier};

    use super::*;

    fn make_custom(name: &str) -> CommandDefinition {
        CommandDefinition {
            name: name.to_string(),
            syntax: format!("/{name} [args]"),
            description: format!("Custom {name}"),
            category: CommandCategory::Custom,
            handler: HandlerTier::Custom,
            min_args: 0,
            max_args: 16,
            allow_flags: true,
            source: CommandSource::Skill,
            source_path: Some(PathBuf::from(format!("/skills/{name}/SKILL.md"))),
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let registry = CommandRegistry::new();

        let compact = registry.get("compact").unwrap();
        assert_eq!(compact.handler, HandlerTier::CliProxy);
        assert_eq!(compact.category, CommandCategory::Session);

        let help = registry.get("help").unwrap();
        assert_eq!(help.handler, HandlerTier::Local);

        assert!(registry.list().len() >= 30);
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_custom_cannot_shadow_builtin() {
        let registry = CommandRegistry::new();
        registry.replace_custom(vec![make_custom("help"), make_custom("deploy")]);

        assert_eq!(registry.get("help").unwrap().source, CommandSource::Builtin);
        assert_eq!(registry.get("deploy").unwrap().source, CommandSource::Skill);
        assert_eq!(registry.custom_snapshot().len(), 1);
    }

    #[test]
    fn test_replace_custom_discards_previous_set() {
        let registry = CommandRegistry::new();
        registry.replace_custom(vec![make_custom("alpha"), make_custom("beta")]);
        assert!(registry.exists("alpha"));

        registry.replace_custom(vec![make_custom("gamma")]);
        assert!(!registry.exists("alpha"));
        assert!(!registry.exists("beta"));
        assert!(registry.exists("gamma"));
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let shared = CommandRegistry::new();
        let snapshot = CommandRegistry::with_custom(vec![make_custom("deploy")]);
        shared.adopt_custom(&snapshot);
        assert!(shared.exists("deploy"));

        shared.replace_custom(Vec::new());
        assert!(!shared.exists("deploy"));
        assert!(snapshot.exists("deploy"));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let registry = CommandRegistry::new();
        let mut second = make_custom("dup");
        second.description = "second".to_string();
        registry.replace_custom(vec![make_custom("dup"), second]);

        assert_eq!(registry.get("dup").unwrap().description, "Custom dup");
    }

    #[test]
    fn test_find_by_prefix_case_insensitive() {
        let registry = CommandRegistry::new();
        registry.replace_custom(vec![make_custom("compare")]);

        let names: Vec<_> = registry
            .find_by_prefix("CO")
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert!(names.contains(&"compact".to_string()));
        assert!(names.contains(&"compare".to_string()));
        // Built-ins are listed before custom commands
        assert_eq!(names.last().map(String::as_str), Some("compare"));
    }
}
