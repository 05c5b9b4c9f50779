//! Composer Mentions - `@` mention suggestion and resolution.
//!
//! Four providers (file, directory, image, remote resource) answer suggestion
//! and resolution queries for a workspace. File and directory indexes are
//! built by an explicit-stack tree walk and kept in an [`IndexCache`] keyed by
//! workspace id, with a short time-to-live and shared in-flight builds. The
//! [`MentionCoordinator`] chooses providers from the shape of the query,
//! merges and ranks their suggestions, and resolves queries with fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use composer_mentions::{IndexCache, MentionContext, MentionCoordinator, ProviderSet};
//!
//! let coordinator = MentionCoordinator::new(ProviderSet::new(IndexCache::with_defaults()));
//! let ctx = MentionContext::new("ws", "/path/to/project", "src/");
//! for item in coordinator.suggest(&ctx).await {
//!     println!("{}", item.value);
//! }
//! ```

pub mod cache;
pub mod coordinator;
pub mod error;
pub mod paths;
pub mod providers;
pub mod ranking;
pub mod walker;

pub use cache::{
    CacheConfig, CacheStats, DEFAULT_INDEX_TTL, DEFAULT_MAX_ENTRIES, Index, IndexCache,
};
pub use coordinator::{
    MentionCoordinator, infer_mention_type, is_remote_query, plan, resolution_order,
};
pub use error::ResolveFailure;
pub use paths::{ContainedPath, contain, normalize_path};
pub use providers::{
    DirectoryProvider, FileProvider, IMAGE_EXTENSIONS, ImageProvider, McpProvider, MentionContext,
    MentionProvider, ProviderSet, is_image_path, mention_id, parse_mcp_query,
};
pub use ranking::{MAX_RESULTS, rank_suggestions};
pub use walker::{ALWAYS_EXCLUDED, IndexKind, IndexedPath};
