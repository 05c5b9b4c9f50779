//! Path normalization and workspace containment checks.

use std::path::{Component, Path, PathBuf};

use tokio::fs;

/// A mention target known to lie inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedPath {
    /// The workspace root joined with the relative path.
    pub absolute_path: PathBuf,
    /// `/`-separated path relative to the root; empty for the root itself.
    pub relative_path: String,
}

/// Normalizes a path by resolving `.` and `..` components without filesystem access.
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !normalized.pop() && !path.is_absolute() {
                    normalized.push("..");
                }
            }
            Component::CurDir => {}
            _ => normalized.push(component),
        }
    }

    normalized
}

/// Joins the components of a relative path with `/`.
pub fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves `query` against `root` and checks that the result stays inside it.
///
/// The joined path is normalized lexically first. When the target exists it is
/// also canonicalized, so a symlink pointing outside the workspace is
/// rejected. Returns `None` when the target escapes the root.
pub async fn contain(root: &Path, query: &str) -> Option<ContainedPath> {
    let canonical_root = match fs::canonicalize(root).await {
        Ok(path) => path,
        Err(_) => normalize_path(root),
    };

    let lexical = normalize_path(&canonical_root.join(query));
    let relative = lexical.strip_prefix(&canonical_root).ok()?.to_path_buf();

    if let Ok(canonical) = fs::canonicalize(&lexical).await
        && !canonical.starts_with(&canonical_root)
    {
        return None;
    }

    Some(ContainedPath {
        absolute_path: root.join(&relative),
        relative_path: to_slash_path(&relative),
    })
}
