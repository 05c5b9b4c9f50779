//! Workspace lookup.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

/// Maps workspace ids to their root directories.
pub trait WorkspaceResolver: Send + Sync {
    /// The root path of a workspace, or `None` if the id is unknown.
    fn workspace_path(&self, workspace_id: &str) -> Option<PathBuf>;
}

/// In-memory workspace table.
#[derive(Debug, Default)]
pub struct StaticWorkspaces {
    workspaces: RwLock<HashMap<String, PathBuf>>,
}

impl StaticWorkspaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticWorkspaces::insert`].
    pub fn with(self, workspace_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(workspace_id, path);
        self
    }

    /// Registers or replaces a workspace.
    pub fn insert(&self, workspace_id: impl Into<String>, path: impl Into<PathBuf>) {
        self.workspaces
            .write()
            .insert(workspace_id.into(), path.into());
    }

    pub fn remove(&self, workspace_id: &str) -> Option<PathBuf> {
        self.workspaces.write().remove(workspace_id)
    }
}

impl WorkspaceResolver for StaticWorkspaces {
    fn workspace_path(&self, workspace_id: &str) -> Option<PathBuf> {
        self.workspaces.read().get(workspace_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_workspaces() {
        let workspaces = StaticWorkspaces::new().with("ws", "/tmp/ws");
        assert_eq!(workspaces.workspace_path("ws"), Some(PathBuf::from("/tmp/ws")));
        assert_eq!(workspaces.workspace_path("other"), None);

        workspaces.insert("ws", "/tmp/moved");
        assert_eq!(workspaces.workspace_path("ws"), Some(PathBuf::from("/tmp/moved")));
        assert!(workspaces.remove("ws").is_some());
        assert_eq!(workspaces.workspace_path("ws"), None);
    }
}
