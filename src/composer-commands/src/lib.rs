//! Slash-command system for the composer.
//!
//! This crate holds the built-in command catalogue, the registry that joins it
//! with custom commands, and the loader that discovers custom commands from
//! skill documents on disk.
//!
//! # Skill File Format
//!
//! Skills are Markdown documents with an optional frontmatter block:
//!
//! ```markdown
//! ---
//! name: deploy
//! description: Deploy the current branch
//! ---
//!
//! Instructions for the assistant.
//! ```
//!
//! # Search Paths
//!
//! Skills are discovered, in order, from:
//! 1. `<workspace>/.claude/skills/*/SKILL.md`
//! 2. `~/.claude/skills/*/SKILL.md`
//! 3. `<workspace>/.claude/commands/*.md`
//!
//! ```rust,ignore
//! use composer_commands::{CommandRegistry, SkillLoader};
//!
//! let registry = CommandRegistry::new();
//! let loader = SkillLoader::new();
//! registry.replace_custom(loader.load_all(Some(workspace)).await);
//! ```

pub mod builtin;
pub mod frontmatter;
pub mod loader;
pub mod registry;

// Re-exports
pub use builtin::{LOCAL_COMMANDS, builtin_commands, is_builtin};
pub use frontmatter::{Frontmatter, normalize_command_name, parse_frontmatter};
pub use loader::{LoaderError, SkillLayout, SkillLoader, SkillLocation, skill_definition};
pub use registry::CommandRegistry;
