//! Workspace tree walker used to build mention indexes.
//!
//! The walk keeps an explicit stack of pending directories instead of
//! recursing, so memory is bounded by the number of directories waiting to be
//! read rather than by tree depth. Entries of each directory are sorted with
//! directories first, then by name, which keeps the index order stable across
//! runs.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tokio::fs;
use tracing::debug;

/// Names that are never indexed, regardless of ignore rules.
pub const ALWAYS_EXCLUDED: &[&str] = &[".git", "node_modules"];

/// Kind of index built from a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Files,
    Directories,
}

/// A path recorded in a workspace index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPath {
    /// Path relative to the workspace root, `/`-separated, without a trailing
    /// separator.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub is_dir: bool,
}

/// Options for a single walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub kind: IndexKind,
    /// Stop once this many entries have been collected.
    pub max_entries: usize,
    /// Apply the `.gitignore` found at the workspace root.
    pub respect_gitignore: bool,
}

/// Result of a walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub entries: Vec<IndexedPath>,
    /// Number of directories successfully read.
    pub dirs_read: u64,
    /// True if the entry cap was reached before the walk finished.
    pub truncated: bool,
}

/// Build the matcher for the `.gitignore` at the workspace root, if any.
pub fn load_root_gitignore(root: &Path) -> Option<Gitignore> {
    let path = root.join(".gitignore");
    if !path.is_file() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&path) {
        debug!("Partial .gitignore at {:?}: {}", path, err);
    }

    match builder.build() {
        Ok(gitignore) => Some(gitignore),
        Err(e) => {
            debug!("Ignoring unparsable .gitignore at {:?}: {}", path, e);
            None
        }
    }
}

/// Walk `root` and collect the entries selected by `options`.
///
/// Unreadable directories contribute nothing.
pub async fn walk_workspace(root: &Path, options: &WalkOptions) -> WalkOutcome {
    let gitignore = if options.respect_gitignore {
        load_root_gitignore(root)
    } else {
        None
    };

    let mut outcome = WalkOutcome::default();
    let mut stack: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, relative)) = stack.pop() {
        if outcome.entries.len() >= options.max_entries {
            outcome.truncated = true;
            break;
        }

        let children = match read_children(&dir, gitignore.as_ref()).await {
            Some(children) => children,
            None => continue,
        };
        outcome.dirs_read += 1;

        let mut subdirs = Vec::new();
        for child in children {
            let relative_path = if relative.is_empty() {
                child.name
            } else {
                format!("{relative}/{}", child.name)
            };

            let wanted = match options.kind {
                IndexKind::Files => !child.is_dir,
                IndexKind::Directories => child.is_dir,
            };
            if wanted {
                if outcome.entries.len() >= options.max_entries {
                    outcome.truncated = true;
                    break;
                }
                outcome.entries.push(IndexedPath {
                    relative_path: relative_path.clone(),
                    absolute_path: child.path.clone(),
                    is_dir: child.is_dir,
                });
            }

            if child.is_dir {
                subdirs.push((child.path, relative_path));
            }
        }

        // Reversed so the first directory in sort order is read next
        stack.extend(subdirs.into_iter().rev());
    }

    outcome
}

struct Child {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

async fn read_children(dir: &Path, gitignore: Option<&Gitignore>) -> Option<Vec<Child>> {
    let mut reader = match fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(e) => {
            debug!("Skipping unreadable directory {:?}: {}", dir, e);
            return None;
        }
    };

    let mut children = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped reading {:?}: {}", dir, e);
                break;
            }
        };

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if ALWAYS_EXCLUDED.contains(&name.as_str()) {
            continue;
        }

        let path = entry.path();
        let is_dir = match entry.file_type().await {
            // Symlinked directories are not followed
            Ok(file_type) if file_type.is_symlink() => match fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => false,
                _ => continue,
            },
            Ok(file_type) => file_type.is_dir(),
            Err(_) => continue,
        };

        if let Some(gitignore) = gitignore
            && gitignore.matched(&path, is_dir).is_ignore()
        {
            continue;
        }

        children.push(Child { name, path, is_dir });
    }

    children.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Some(children)
}
