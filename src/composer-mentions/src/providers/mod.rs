//! Mention providers.
//!
//! Each provider indexes one kind of mention target and answers suggestion
//! and resolution queries for it. Providers are selected through
//! [`ProviderSet`], a dispatch table keyed by [`MentionType`].
//!
//! ```rust,ignore
//! use composer_mentions::{IndexCache, MentionContext, ProviderSet};
//! use composer_protocol::MentionType;
//!
//! let providers = ProviderSet::new(IndexCache::with_defaults());
//! let ctx = MentionContext::new("ws", "/path/to/project", "src/");
//! let items = providers.get(MentionType::Directory).suggest(&ctx).await;
//! ```

pub mod directory;
pub mod file;
pub mod image;
pub mod mcp;

pub use directory::DirectoryProvider;
pub use file::FileProvider;
pub use image::{IMAGE_EXTENSIONS, ImageProvider, is_image_path};
pub use mcp::{McpProvider, parse_mcp_query};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use composer_protocol::{MentionRef, MentionSuggestion, MentionType, SuggestionKind};

use crate::cache::IndexCache;
use crate::paths::ContainedPath;
use crate::ranking::MAX_RESULTS;

// ============================================================================
// Core Types
// ============================================================================

/// Input shared by suggestion and resolution calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionContext {
    pub workspace_id: String,
    pub workspace_path: PathBuf,
    /// Text after the `@`.
    pub query: String,
}

impl MentionContext {
    pub fn new(
        workspace_id: impl Into<String>,
        workspace_path: impl Into<PathBuf>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            workspace_path: workspace_path.into(),
            query: query.into(),
        }
    }
}

/// A source of mention suggestions and references.
#[async_trait]
pub trait MentionProvider: Send + Sync {
    /// The mention type this provider produces.
    fn kind(&self) -> MentionType;

    /// Ranked suggestions for a partial query. Never fails; indexing errors
    /// yield fewer suggestions.
    async fn suggest(&self, ctx: &MentionContext) -> Vec<MentionSuggestion>;

    /// Resolves a complete query to a reference, or `None` if this provider
    /// does not recognize it.
    async fn resolve(&self, ctx: &MentionContext) -> Option<MentionRef>;
}

// ============================================================================
// Dispatch Table
// ============================================================================

/// The four providers, one per mention type.
#[derive(Clone)]
pub struct ProviderSet {
    file: Arc<dyn MentionProvider>,
    directory: Arc<dyn MentionProvider>,
    image: Arc<dyn MentionProvider>,
    mcp: Arc<dyn MentionProvider>,
}

impl ProviderSet {
    /// Creates the default providers over a shared index cache.
    pub fn new(cache: IndexCache) -> Self {
        Self::with_limit(cache, MAX_RESULTS)
    }

    /// Creates the default providers with a custom per-provider result cap.
    pub fn with_limit(cache: IndexCache, max_results: usize) -> Self {
        let file = FileProvider::new(cache.clone()).with_limit(max_results);
        Self {
            image: Arc::new(ImageProvider::new(file.clone())),
            directory: Arc::new(DirectoryProvider::new(cache).with_limit(max_results)),
            file: Arc::new(file),
            mcp: Arc::new(McpProvider),
        }
    }

    /// Replaces the provider registered for `provider.kind()`.
    pub fn with_provider(mut self, provider: Arc<dyn MentionProvider>) -> Self {
        match provider.kind() {
            MentionType::File => self.file = provider,
            MentionType::Directory => self.directory = provider,
            MentionType::Image => self.image = provider,
            MentionType::Mcp => self.mcp = provider,
        }
        self
    }

    /// The provider for a mention type.
    pub fn get(&self, kind: MentionType) -> &dyn MentionProvider {
        match kind {
            MentionType::File => self.file.as_ref(),
            MentionType::Directory => self.directory.as_ref(),
            MentionType::Image => self.image.as_ref(),
            MentionType::Mcp => self.mcp.as_ref(),
        }
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet").finish_non_exhaustive()
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Stable mention id: `<type>:<relative path>`.
pub fn mention_id(kind: MentionType, relative_path: &str) -> String {
    format!("{kind}:{relative_path}")
}

/// Suggestion for a workspace path.
pub(crate) fn path_suggestion(
    kind: MentionType,
    relative_path: String,
    absolute_path: PathBuf,
) -> MentionSuggestion {
    MentionSuggestion {
        kind: SuggestionKind::Mention,
        id: mention_id(kind, &relative_path),
        display: relative_path.clone(),
        value: relative_path.clone(),
        absolute_path: Some(absolute_path),
        relative_path: Some(relative_path),
        mention_type: kind,
    }
}

/// Reference to a contained workspace path.
pub(crate) fn path_reference(
    kind: MentionType,
    workspace_id: &str,
    relative_path: String,
    target: ContainedPath,
) -> MentionRef {
    MentionRef {
        id: mention_id(kind, &relative_path),
        mention_type: kind,
        workspace_id: workspace_id.to_string(),
        absolute_path: Some(target.absolute_path),
        display: relative_path.clone(),
        relative_path: Some(relative_path),
        payload: None,
    }
}
