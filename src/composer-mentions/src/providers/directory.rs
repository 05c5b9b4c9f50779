//! Directory mentions.
//!
//! Directories are indexed without applying `.gitignore`; only `.git` and
//! `node_modules` are excluded. Every suggestion ends with `/`.

use async_trait::async_trait;
use composer_protocol::{MentionRef, MentionSuggestion, MentionType};
use tokio::fs;

use super::{MentionContext, MentionProvider, path_reference, path_suggestion};
use crate::cache::IndexCache;
use crate::paths::contain;
use crate::ranking::{MAX_RESULTS, rank_suggestions};
use crate::walker::IndexKind;

/// Suggests and resolves workspace directories.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    cache: IndexCache,
    max_results: usize,
}

impl DirectoryProvider {
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
}

#[async_trait]
impl MentionProvider for DirectoryProvider {
    fn kind(&self) -> MentionType {
        MentionType::Directory
    }

    async fn suggest(&self, ctx: &MentionContext) -> Vec<MentionSuggestion> {
        let index = self
            .cache
            .get_or_build(IndexKind::Directories, &ctx.workspace_id, &ctx.workspace_path)
            .await;

        let candidates = index
            .iter()
            .map(|entry| {
                path_suggestion(
                    MentionType::Directory,
                    format!("{}/", entry.relative_path),
                    entry.absolute_path.clone(),
                )
            })
            .collect();

        rank_suggestions(candidates, &ctx.query, self.max_results)
    }

    async fn resolve(&self, ctx: &MentionContext) -> Option<MentionRef> {
        let target = contain(&ctx.workspace_path, &ctx.query).await?;
        if target.relative_path.is_empty() {
            return None;
        }

        let meta = fs::metadata(&target.absolute_path).await.ok()?;
        if !meta.is_dir() {
            return None;
        }

        let relative_path = format!("{}/", target.relative_path);
        Some(path_reference(
            MentionType::Directory,
            &ctx.workspace_id,
            relative_path,
            target,
        ))
    }
}
