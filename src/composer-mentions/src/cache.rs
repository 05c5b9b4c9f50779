//! Per-workspace index cache with TTL and in-flight build sharing.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::walker::{IndexKind, IndexedPath, WalkOptions, walk_workspace};

/// Default time-to-live of a workspace index.
pub const DEFAULT_INDEX_TTL: Duration = Duration::from_secs(10);

/// Default maximum number of paths kept per index.
pub const DEFAULT_MAX_ENTRIES: usize = 8_000;

/// A built index, shared between callers.
pub type Index = Arc<Vec<IndexedPath>>;

type BuildFuture = Shared<BoxFuture<'static, Index>>;

/// Configuration for the index cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a built index stays valid.
    pub ttl: Duration,
    /// Maximum number of paths per index.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_INDEX_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: IndexKind,
    workspace_id: String,
}

struct CacheEntry {
    paths: Index,
    built_at: Instant,
}

struct InFlight {
    generation: u64,
    build: BuildFuture,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    in_flight: HashMap<CacheKey, InFlight>,
    next_generation: u64,
}

struct CacheInner {
    config: CacheConfig,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    dir_reads: AtomicU64,
}

/// Cache of workspace indexes keyed by index kind and workspace id.
///
/// While no valid entry exists, concurrent callers for the same key await a
/// single shared build. Different workspace ids never share an entry or a
/// build. Cloning the cache yields another handle to the same state.
#[derive(Clone)]
pub struct IndexCache {
    inner: Arc<CacheInner>,
}

impl IndexCache {
    /// Creates a new index cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                config,
                state: Mutex::new(CacheState::default()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                builds: AtomicU64::new(0),
                dir_reads: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a new index cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Returns the index for a workspace, building it if missing or expired.
    pub async fn get_or_build(&self, kind: IndexKind, workspace_id: &str, root: &Path) -> Index {
        let key = CacheKey {
            kind,
            workspace_id: workspace_id.to_string(),
        };

        let build = {
            let mut state = self.inner.state.lock();

            if let Some(entry) = state.entries.get(&key)
                && entry.built_at.elapsed() < self.inner.config.ttl
            {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Index cache hit for {:?} of '{}'", kind, workspace_id);
                return Arc::clone(&entry.paths);
            }

            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            match state.in_flight.get(&key) {
                Some(in_flight) => {
                    debug!("Joining in-flight {:?} build for '{}'", kind, workspace_id);
                    in_flight.build.clone()
                }
                None => {
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    let build = self.start_build(key.clone(), generation, root.to_path_buf());
                    state.in_flight.insert(
                        key,
                        InFlight {
                            generation,
                            build: build.clone(),
                        },
                    );
                    build
                }
            }
        };

        build.await
    }

    fn start_build(&self, key: CacheKey, generation: u64, root: PathBuf) -> BuildFuture {
        self.inner.builds.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);

        async move {
            let options = WalkOptions {
                kind: key.kind,
                max_entries: inner.config.max_entries,
                respect_gitignore: key.kind == IndexKind::Files,
            };

            let started = Instant::now();
            let outcome = walk_workspace(&root, &options).await;
            inner.dir_reads.fetch_add(outcome.dirs_read, Ordering::Relaxed);
            info!(
                "Indexed {} {:?} entries for '{}' in {:?}{}",
                outcome.entries.len(),
                key.kind,
                key.workspace_id,
                started.elapsed(),
                if outcome.truncated { " (truncated)" } else { "" }
            );

            let paths = Arc::new(outcome.entries);
            let mut state = inner.state.lock();
            // An invalidation during the walk drops this result
            let current = state
                .in_flight
                .get(&key)
                .is_some_and(|f| f.generation == generation);
            if current {
                state.in_flight.remove(&key);
                state.entries.insert(
                    key,
                    CacheEntry {
                        paths: Arc::clone(&paths),
                        built_at: Instant::now(),
                    },
                );
            }
            paths
        }
        .boxed()
        .shared()
    }

    /// Drops every index of a workspace, including builds still running.
    pub fn invalidate(&self, workspace_id: &str) {
        let mut state = self.inner.state.lock();
        state.entries.retain(|k, _| k.workspace_id != workspace_id);
        state.in_flight.retain(|k, _| k.workspace_id != workspace_id);
    }

    /// Clears all cached indexes.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.entries.clear();
        state.in_flight.clear();
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.state.lock().entries.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            builds: self.inner.builds.load(Ordering::Relaxed),
            dir_reads: self.inner.dir_reads.load(Ordering::Relaxed),
        }
    }
}

impl Default for IndexCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for IndexCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexCache")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached indexes.
    pub entries: usize,
    /// Lookups answered from a valid entry.
    pub hits: u64,
    /// Lookups that found no valid entry.
    pub misses: u64,
    /// Index builds started.
    pub builds: u64,
    /// Directories read by all builds.
    pub dir_reads: u64,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/components")).unwrap();
        fs::write(dir.path().join("src/main.ts"), "").unwrap();
        fs::write(dir.path().join("src/components/Button.tsx"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_concurrent_builds_are_shared() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();

        let (a, b) = tokio::join!(
            cache.get_or_build(IndexKind::Files, "ws", dir.path()),
            cache.get_or_build(IndexKind::Files, "ws", dir.path()),
        );

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        let stats = cache.stats();
        assert_eq!(stats.builds, 1);
        // root, src, src/components
        assert_eq!(stats.dir_reads, 3);
    }

    #[tokio::test]
    async fn test_valid_entry_skips_rebuild() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();

        cache.get_or_build(IndexKind::Files, "ws", dir.path()).await;
        fs::write(dir.path().join("late.rs"), "").unwrap();
        let index = cache.get_or_build(IndexKind::Files, "ws", dir.path()).await;

        assert_eq!(index.len(), 2);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.builds, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_rebuilds() {
        let dir = workspace();
        let cache = IndexCache::new(CacheConfig {
            ttl: Duration::ZERO,
            ..Default::default()
        });

        cache.get_or_build(IndexKind::Files, "ws", dir.path()).await;
        fs::write(dir.path().join("late.rs"), "").unwrap();
        let index = cache.get_or_build(IndexKind::Files, "ws", dir.path()).await;

        assert_eq!(index.len(), 3);
        assert_eq!(cache.stats().builds, 2);
    }

    #[tokio::test]
    async fn test_workspaces_and_kinds_are_separate() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();

        cache.get_or_build(IndexKind::Files, "a", dir.path()).await;
        cache.get_or_build(IndexKind::Files, "b", dir.path()).await;
        let dirs = cache
            .get_or_build(IndexKind::Directories, "a", dir.path())
            .await;

        assert_eq!(dirs.len(), 2);
        let stats = cache.stats();
        assert_eq!(stats.builds, 3);
        assert_eq!(stats.entries, 3);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let dir = workspace();
        let cache = IndexCache::with_defaults();

        cache.get_or_build(IndexKind::Files, "ws", dir.path()).await;
        cache
            .get_or_build(IndexKind::Directories, "ws", dir.path())
            .await;
        cache.get_or_build(IndexKind::Files, "other", dir.path()).await;
        cache.invalidate("ws");

        assert_eq!(cache.stats().entries, 1);
        cache.get_or_build(IndexKind::Files, "ws", dir.path()).await;
        assert_eq!(cache.stats().builds, 4);
    }
}
