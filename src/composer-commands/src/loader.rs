//! Skill loader for discovering custom commands on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use composer_protocol::{CommandCategory, CommandDefinition, CommandSource, HandlerTier};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::builtin::is_builtin;
use crate::frontmatter::{first_body_line, normalize_command_name, parse_frontmatter};

/// File name of a skill document inside its skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Maximum number of arguments accepted by a custom command.
pub const CUSTOM_MAX_ARGS: usize = 16;

const DEFAULT_DESCRIPTION: &str = "Custom command";

/// Errors that can occur when loading skills.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// How skill documents are laid out inside a search directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLayout {
    /// `<dir>/<skill>/SKILL.md`
    SkillDirs,
    /// `<dir>/<command>.md`
    FlatCommands,
}

/// A directory scanned for skill documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLocation {
    pub dir: PathBuf,
    pub layout: SkillLayout,
}

/// Loader for custom commands described by skill documents.
#[derive(Debug, Clone)]
pub struct SkillLoader {
    home_dir: Option<PathBuf>,
}

impl Default for SkillLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillLoader {
    /// Create a loader rooted at the operator's home directory.
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
        }
    }

    /// Create a loader with an explicit home directory (`None` disables
    /// global skills).
    pub fn with_home(home_dir: Option<PathBuf>) -> Self {
        Self { home_dir }
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    /// Search locations in discovery order.
    ///
    /// 1. `<workspace>/.claude/skills/*/SKILL.md`
    /// 2. `<home>/.claude/skills/*/SKILL.md`
    /// 3. `<workspace>/.claude/commands/*.md`
    pub fn search_locations(&self, workspace: Option<&Path>) -> Vec<SkillLocation> {
        let mut locations = Vec::with_capacity(3);

        if let Some(root) = workspace {
            locations.push(SkillLocation {
                dir: root.join(".claude").join("skills"),
                layout: SkillLayout::SkillDirs,
            });
        }

        if let Some(home) = &self.home_dir {
            locations.push(SkillLocation {
                dir: home.join(".claude").join("skills"),
                layout: SkillLayout::SkillDirs,
            });
        }

        if let Some(root) = workspace {
            locations.push(SkillLocation {
                dir: root.join(".claude").join("commands"),
                layout: SkillLayout::FlatCommands,
            });
        }

        locations
    }

    /// Load every custom command visible from `workspace`.
    ///
    /// Names reserved by built-ins are dropped and the first occurrence of a
    /// duplicate name wins. Missing directories and unreadable files are
    /// skipped.
    pub async fn load_all(&self, workspace: Option<&Path>) -> Vec<CommandDefinition> {
        let mut commands = Vec::new();
        let mut seen_names = HashSet::new();

        for location in self.search_locations(workspace) {
            let found = match self.load_from_location(&location).await {
                Ok(found) => found,
                Err(LoaderError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Skill directory {:?} does not exist, skipping", location.dir);
                    continue;
                }
                Err(e) => {
                    warn!("Error loading skills from {:?}: {}", location.dir, e);
                    continue;
                }
            };

            for def in found {
                if is_builtin(&def.name) {
                    debug!("Skipping skill '{}': name is reserved", def.name);
                } else if !seen_names.insert(def.name.clone()) {
                    debug!(
                        "Skipping duplicate skill '{}' from {:?}",
                        def.name, def.source_path
                    );
                } else {
                    commands.push(def);
                }
            }
        }

        if !commands.is_empty() {
            info!("Loaded {} custom commands", commands.len());
        }
        commands
    }

    /// Load the skills of a single location, sorted by path.
    pub async fn load_from_location(
        &self,
        location: &SkillLocation,
    ) -> Result<Vec<CommandDefinition>, LoaderError> {
        let mut candidates = Vec::new();
        let mut entries = fs::read_dir(&location.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match location.layout {
                SkillLayout::SkillDirs => {
                    let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
                    if is_dir {
                        let skill_file = path.join(SKILL_FILE);
                        if fs::try_exists(&skill_file).await.unwrap_or(false) {
                            candidates.push(skill_file);
                        }
                    }
                }
                SkillLayout::FlatCommands => {
                    if path.extension().is_some_and(|ext| ext == "md") {
                        candidates.push(path);
                    }
                }
            }
        }
        candidates.sort();

        let mut commands = Vec::with_capacity(candidates.len());
        for path in candidates {
            match self.load_from_file(&path, location.layout).await {
                Ok(Some(def)) => {
                    debug!("Loaded skill '{}' from {:?}", def.name, path);
                    commands.push(def);
                }
                Ok(None) => debug!("Skill at {:?} has no usable name, skipping", path),
                Err(e) => warn!("Failed to load skill from {:?}: {}", path, e),
            }
        }

        Ok(commands)
    }

    /// Load a single skill document.
    ///
    /// Returns `Ok(None)` when no command name can be derived.
    pub async fn load_from_file(
        &self,
        path: &Path,
        layout: SkillLayout,
    ) -> Result<Option<CommandDefinition>, LoaderError> {
        let fallback_name = match layout {
            SkillLayout::SkillDirs => path.parent().and_then(|p| p.file_name()),
            SkillLayout::FlatCommands => path.file_stem(),
        }
        .and_then(|s| s.to_str())
        .ok_or_else(|| LoaderError::InvalidPath(format!("Invalid skill path: {:?}", path)))?
        .to_string();

        let content = fs::read_to_string(path).await?;
        Ok(skill_definition(&content, &fallback_name, path))
    }
}

/// Build a custom command definition from a skill document.
pub fn skill_definition(
    content: &str,
    fallback_name: &str,
    path: &Path,
) -> Option<CommandDefinition> {
    let (frontmatter, body) = parse_frontmatter(content);

    let name = normalize_command_name(frontmatter.name.as_deref().unwrap_or(fallback_name));
    if name.is_empty() {
        return None;
    }

    let description = frontmatter
        .description
        .or_else(|| first_body_line(body).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    Some(CommandDefinition {
        syntax: format!("/{name} [args]"),
        name,
        description,
        category: CommandCategory::Custom,
        handler: HandlerTier::Custom,
        min_args: 0,
        max_args: CUSTOM_MAX_ARGS,
        allow_flags: true,
        source: CommandSource::Skill,
        source_path: Some(path.to_path_buf()),
    })
}
