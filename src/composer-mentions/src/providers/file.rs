//! File mentions backed by the gitignore-aware file index.

use async_trait::async_trait;
use composer_protocol::{MentionRef, MentionSuggestion, MentionType};
use tokio::fs;

use super::{MentionContext, MentionProvider, path_reference, path_suggestion};
use crate::cache::{Index, IndexCache};
use crate::paths::contain;
use crate::ranking::{MAX_RESULTS, match_tier, rank_suggestions};
use crate::walker::IndexKind;

/// Suggests and resolves workspace files.
#[derive(Debug, Clone)]
pub struct FileProvider {
    cache: IndexCache,
    max_results: usize,
}

impl FileProvider {
    pub fn new(cache: IndexCache) -> Self {
        Self {
            cache,
            max_results: MAX_RESULTS,
        }
    }

    pub fn with_limit(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// The cached file index of a workspace.
    pub async fn index(&self, ctx: &MentionContext) -> Index {
        self.cache
            .get_or_build(IndexKind::Files, &ctx.workspace_id, &ctx.workspace_path)
            .await
    }

    /// Suggestions of `kind` for the indexed files accepted by `keep`.
    pub(crate) async fn suggest_filtered(
        &self,
        ctx: &MentionContext,
        kind: MentionType,
        keep: impl Fn(&str) -> bool + Send,
    ) -> Vec<MentionSuggestion> {
        let index = self.index(ctx).await;
        let query_lower = ctx.query.to_lowercase();

        let candidates = index
            .iter()
            .filter(|entry| keep(&entry.relative_path))
            .filter(|entry| match_tier(&entry.relative_path, &query_lower).is_some())
            .map(|entry| {
                path_suggestion(kind, entry.relative_path.clone(), entry.absolute_path.clone())
            })
            .collect();

        rank_suggestions(candidates, &ctx.query, self.max_results)
    }
}

#[async_trait]
impl MentionProvider for FileProvider {
    fn kind(&self) -> MentionType {
        MentionType::File
    }

    async fn suggest(&self, ctx: &MentionContext) -> Vec<MentionSuggestion> {
        self.suggest_filtered(ctx, MentionType::File, |_| true).await
    }

    async fn resolve(&self, ctx: &MentionContext) -> Option<MentionRef> {
        let target = contain(&ctx.workspace_path, &ctx.query).await?;
        if target.relative_path.is_empty() {
            return None;
        }

        let meta = fs::metadata(&target.absolute_path).await.ok()?;
        if !meta.is_file() {
            return None;
        }

        let relative_path = target.relative_path.clone();
        Some(path_reference(
            MentionType::File,
            &ctx.workspace_id,
            relative_path,
            target,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fs as std_fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std_fs::create_dir_all(root.join("src/components")).unwrap();
        std_fs::create_dir_all(root.join("dist")).unwrap();
        std_fs::write(root.join(".gitignore"), "dist/\n").unwrap();
        std_fs::write(root.join("dist/main.js"), "").unwrap();
        std_fs::write(root.join("src/main.ts"), "").unwrap();
        std_fs::write(root.join("src/components/Button.tsx"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_suggest_skips_ignored_files() {
        let dir = workspace();
        let provider = FileProvider::new(IndexCache::with_defaults());

        let ctx = MentionContext::new("ws", dir.path(), "dist");
        assert!(provider.suggest(&ctx).await.is_empty());

        let ctx = MentionContext::new("ws", dir.path(), "main");
        let values: Vec<_> = provider
            .suggest(&ctx)
            .await
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["src/main.ts"]);
    }

    #[tokio::test]
    async fn test_suggestion_shape() {
        let dir = workspace();
        let provider = FileProvider::new(IndexCache::with_defaults());
        let ctx = MentionContext::new("ws", dir.path(), "button");

        let items = provider.suggest(&ctx).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "file:src/components/Button.tsx");
        assert_eq!(items[0].mention_type, MentionType::File);
        assert_eq!(
            items[0].absolute_path.as_deref(),
            Some(dir.path().join("src/components/Button.tsx").as_path())
        );
    }

    #[tokio::test]
    async fn test_resolve() {
        let dir = workspace();
        let provider = FileProvider::new(IndexCache::with_defaults());

        let ctx = MentionContext::new("ws", dir.path(), "./src/main.ts");
        let mention = provider.resolve(&ctx).await.unwrap();
        assert_eq!(mention.id, "file:src/main.ts");
        assert_eq!(mention.workspace_id, "ws");
        assert_eq!(mention.relative_path.as_deref(), Some("src/main.ts"));

        let ctx = MentionContext::new("ws", dir.path(), "src");
        assert!(provider.resolve(&ctx).await.is_none());

        let ctx = MentionContext::new("ws", dir.path(), "missing.rs");
        assert!(provider.resolve(&ctx).await.is_none());
    }
}
