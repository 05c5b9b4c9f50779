//! Mention coordinator: picks providers per query shape, merges their
//! suggestions and resolves queries with fallback.

use std::collections::HashSet;

use composer_protocol::{MentionRef, MentionSuggestion, MentionType};
use futures::future::join_all;
use tracing::debug;

use crate::error::ResolveFailure;
use crate::paths::contain;
use crate::providers::{MentionContext, ProviderSet, is_image_path};
use crate::ranking::{MAX_RESULTS, rank_suggestions};

/// Fallback order for local mentions.
const LOCAL_ORDER: [MentionType; 3] =
    [MentionType::File, MentionType::Directory, MentionType::Image];

/// True if the query names a remote resource (`server:resource`).
pub fn is_remote_query(query: &str) -> bool {
    query.contains(':') && !query.starts_with("./") && !query.starts_with("../")
}

/// True if the last path segment has a `name.ext` shape.
fn has_extension(query: &str) -> bool {
    let last = query.rsplit('/').next().unwrap_or(query);
    last.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// Providers consulted for suggestions, most likely first.
pub fn plan(query: &str) -> &'static [MentionType] {
    if is_remote_query(query) {
        &[MentionType::Mcp]
    } else if query.ends_with('/') {
        &[MentionType::Directory, MentionType::File]
    } else if is_image_path(query) {
        &[MentionType::Image, MentionType::File]
    } else if has_extension(query) {
        // A file name: directories would be noise
        &[MentionType::File, MentionType::Image]
    } else {
        &[MentionType::File, MentionType::Directory, MentionType::Image]
    }
}

/// The most likely mention type for a query.
pub fn infer_mention_type(query: &str) -> MentionType {
    plan(query)[0]
}

/// Providers tried when resolving, `primary` first.
///
/// Remote resources never fall back to local providers.
pub fn resolution_order(primary: MentionType) -> Vec<MentionType> {
    if primary == MentionType::Mcp {
        return vec![MentionType::Mcp];
    }

    let mut order = vec![primary];
    order.extend(LOCAL_ORDER.iter().copied().filter(|kind| *kind != primary));
    order
}

/// Coordinates the four mention providers.
#[derive(Debug, Clone)]
pub struct MentionCoordinator {
    providers: ProviderSet,
    max_results: usize,
}

impl MentionCoordinator {
    pub fn new(providers: ProviderSet) -> Self {
        Self {
            providers,
            max_results: MAX_RESULTS,
        }
    }

    pub fn with_limit(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    /// Merged, deduplicated and ranked suggestions for a partial query.
    pub async fn suggest(&self, ctx: &MentionContext) -> Vec<MentionSuggestion> {
        let kinds = plan(&ctx.query);
        let results =
            join_all(kinds.iter().map(|kind| self.providers.get(*kind).suggest(ctx))).await;

        let mut seen = HashSet::new();
        let merged: Vec<MentionSuggestion> = results
            .into_iter()
            .flatten()
            .filter(|s| seen.insert((s.id.clone(), s.value.clone())))
            .collect();

        debug!(
            "Mention suggest '{}' via {:?}: {} candidates",
            ctx.query,
            kinds,
            merged.len()
        );
        rank_suggestions(merged, &ctx.query, self.max_results)
    }

    /// Resolves a query using its inferred type first.
    pub async fn resolve(&self, ctx: &MentionContext) -> Result<MentionRef, ResolveFailure> {
        self.resolve_with_hint(ctx, None).await
    }

    /// Resolves a query, trying `preferred` (if any) before the other
    /// providers.
    pub async fn resolve_with_hint(
        &self,
        ctx: &MentionContext,
        preferred: Option<MentionType>,
    ) -> Result<MentionRef, ResolveFailure> {
        let primary = preferred.unwrap_or_else(|| infer_mention_type(&ctx.query));

        if primary != MentionType::Mcp && contain(&ctx.workspace_path, &ctx.query).await.is_none() {
            debug!("Mention '{}' escapes workspace '{}'", ctx.query, ctx.workspace_id);
            return Err(ResolveFailure::OutsideWorkspace);
        }

        for kind in resolution_order(primary) {
            if let Some(mention) = self.providers.get(kind).resolve(ctx).await {
                return Ok(mention);
            }
        }

        debug!("Mention '{}' did not resolve", ctx.query);
        Err(ResolveFailure::Unresolved)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::cache::IndexCache;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for d in ["src/components", "dist", "assets"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        fs::write(root.join(".gitignore"), "dist/\n").unwrap();
        fs::write(root.join("dist/main.js"), "").unwrap();
        fs::write(root.join("src/main.ts"), "").unwrap();
        fs::write(root.join("src/components/Button.tsx"), "").unwrap();
        fs::write(root.join("assets/logo.png"), "").unwrap();
        dir
    }

    fn coordinator(cache: &IndexCache) -> MentionCoordinator {
        MentionCoordinator::new(ProviderSet::new(cache.clone()))
    }

    #[test]
    fn test_plan() {
        use MentionType::{Directory, File, Image, Mcp};

        assert_eq!(plan("docs:openapi/users"), &[Mcp]);
        assert_eq!(plan("./a:b"), &[File, Directory, Image]);
        assert_eq!(plan("src/components/"), &[Directory, File]);
        assert_eq!(plan("assets/logo.PNG"), &[Image, File]);
        assert_eq!(plan("main.ts"), &[File, Image]);
        assert_eq!(plan("src/main"), &[File, Directory, Image]);
        assert_eq!(plan(".gitignore"), &[File, Directory, Image]);
        assert_eq!(infer_mention_type("docs:openapi/users"), Mcp);
    }

    #[test]
    fn test_resolution_order() {
        use MentionType::{Directory, File, Image, Mcp};

        assert_eq!(resolution_order(Image), vec![Image, File, Directory]);
        assert_eq!(resolution_order(File), vec![File, Directory, Image]);
        assert_eq!(resolution_order(Mcp), vec![Mcp]);
    }

    #[tokio::test]
    async fn test_suggest_excludes_ignored() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();
        let ctx = MentionContext::new("ws", dir.path(), "dist");

        let items = coordinator(&cache).suggest(&ctx).await;
        assert!(items.iter().all(|s| s.value != "dist/main.js"));
    }

    #[tokio::test]
    async fn test_suggest_directory_prefix() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();
        let ctx = MentionContext::new("ws", dir.path(), "src/");

        let items = coordinator(&cache).suggest(&ctx).await;
        assert!(
            items
                .iter()
                .any(|s| s.value == "src/" && s.mention_type == MentionType::Directory)
        );
        assert!(items.iter().any(|s| s.value == "src/components/Button.tsx"));
    }

    #[tokio::test]
    async fn test_concurrent_suggest_walks_once() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();
        let coordinator = coordinator(&cache);
        let ctx = MentionContext::new("ws", dir.path(), "main.ts");

        let (a, b) = tokio::join!(coordinator.suggest(&ctx), coordinator.suggest(&ctx));
        assert_eq!(a, b);

        // File and image providers share the single file index build
        let stats = cache.stats();
        assert_eq!(stats.builds, 1);
        // root, assets, src, src/components (dist is ignored)
        assert_eq!(stats.dir_reads, 4);
    }

    #[tokio::test]
    async fn test_resolve_image() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();
        let ctx = MentionContext::new("ws", dir.path(), "assets/logo.png");

        let mention = coordinator(&cache).resolve(&ctx).await.unwrap();
        assert_eq!(mention.mention_type, MentionType::Image);
    }

    #[tokio::test]
    async fn test_resolve_falls_back() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();
        let coordinator = coordinator(&cache);

        // Path-like: file first, then directory
        let ctx = MentionContext::new("ws", dir.path(), "src");
        let mention = coordinator.resolve(&ctx).await.unwrap();
        assert_eq!(mention.id, "directory:src/");

        // Preferred type comes first
        let ctx = MentionContext::new("ws", dir.path(), "assets/logo.png");
        let mention = coordinator
            .resolve_with_hint(&ctx, Some(MentionType::File))
            .await
            .unwrap();
        assert_eq!(mention.id, "file:assets/logo.png");
    }

    #[tokio::test]
    async fn test_resolve_failures() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();
        let coordinator = coordinator(&cache);

        let ctx = MentionContext::new("ws", dir.path(), "../outside.txt");
        assert_eq!(
            coordinator.resolve(&ctx).await,
            Err(ResolveFailure::OutsideWorkspace)
        );

        let ctx = MentionContext::new("ws", dir.path(), "missing.rs");
        assert_eq!(coordinator.resolve(&ctx).await, Err(ResolveFailure::Unresolved));

        // Remote resources never fall back to the filesystem
        let ctx = MentionContext::new("ws", dir.path(), "docs:");
        assert_eq!(coordinator.resolve(&ctx).await, Err(ResolveFailure::Unresolved));

        let ctx = MentionContext::new("ws", dir.path(), "docs:openapi/users");
        let mention = coordinator.resolve(&ctx).await.unwrap();
        assert_eq!(mention.mention_type, MentionType::Mcp);
    }
}
