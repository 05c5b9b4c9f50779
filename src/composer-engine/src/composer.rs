//! The composer facade: suggest, prepare and execute.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use composer_commands::{CommandRegistry, SkillLoader};
use composer_mentions::{
    IndexCache, MentionContext, MentionCoordinator, ProviderSet, ResolveFailure,
};
use composer_protocol::{
    ComposerDiagnostic, ComposerExecutionResult, ComposerParseResult, ComposerSuggestResult,
    ExecutionProvider, MentionQuery, MentionRef, MentionType, PrepareRequest, SuggestContext,
    SuggestRequest, Suggestions,
};
use tracing::{debug, info, warn};

use crate::bridge::{AssistantBridge, AssistantRequest};
use crate::config::ComposerConfig;
use crate::cursor::{CursorContext, classify_cursor};
use crate::parser::parse_draft;
use crate::router::{Route, build_prompt, local_response, route};
use crate::stream::{StreamGuard, StreamSender};
use crate::workspace::WorkspaceResolver;

/// Entry point of the composer pipeline.
///
/// One `Composer` is shared by every composer box of the shell. The custom
/// command set follows the workspace of the latest request.
pub struct Composer {
    registry: Arc<CommandRegistry>,
    loader: SkillLoader,
    cache: IndexCache,
    mentions: MentionCoordinator,
    workspaces: Arc<dyn WorkspaceResolver>,
    bridge: Arc<dyn AssistantBridge>,
    config: ComposerConfig,
}

impl Composer {
    pub fn new(
        config: ComposerConfig,
        workspaces: Arc<dyn WorkspaceResolver>,
        bridge: Arc<dyn AssistantBridge>,
    ) -> Self {
        let loader = match &config.skills.home_dir {
            Some(home) => SkillLoader::with_home(Some(home.clone())),
            None => SkillLoader::new(),
        };
        let cache = IndexCache::new(config.cache_config());
        let providers = ProviderSet::with_limit(cache.clone(), config.mentions.max_results);
        let mentions = MentionCoordinator::new(providers).with_limit(config.mentions.max_results);

        Self {
            registry: Arc::new(CommandRegistry::new()),
            loader,
            cache,
            mentions,
            workspaces,
            bridge,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn index_cache(&self) -> &IndexCache {
        &self.cache
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    fn workspace_path(&self, workspace_id: Option<&str>) -> Option<PathBuf> {
        workspace_id.and_then(|id| self.workspaces.workspace_path(id))
    }

    /// Reloads custom commands for a workspace.
    ///
    /// The returned registry is a snapshot for the calling request; the
    /// shared registry is switched to the same set.
    pub async fn refresh_commands(&self, workspace: Option<&Path>) -> CommandRegistry {
        let commands = self.loader.load_all(workspace).await;
        debug!("Refreshed custom commands for {:?}: {}", workspace, commands.len());
        let snapshot = CommandRegistry::with_custom(commands);
        self.registry.adopt_custom(&snapshot);
        snapshot
    }

    // ========================================================================
    // Suggest
    // ========================================================================

    /// Suggestions for the text at the cursor. Advisory only.
    pub async fn suggest(&self, request: &SuggestRequest) -> ComposerSuggestResult {
        match classify_cursor(&request.raw_input, request.cursor) {
            CursorContext::None => ComposerSuggestResult::none(),
            CursorContext::Command { query, .. } => {
                let workspace = self.workspace_path(request.workspace_id.as_deref());
                let commands = self.refresh_commands(workspace.as_deref()).await;
                ComposerSuggestResult {
                    context: SuggestContext::Command,
                    query: query.to_string(),
                    suggestions: Suggestions::Commands(commands.find_by_prefix(query)),
                }
            }
            CursorContext::Mention { query, .. } => {
                let items = match (
                    request.workspace_id.as_deref(),
                    self.workspace_path(request.workspace_id.as_deref()),
                ) {
                    (Some(id), Some(path)) => {
                        let ctx = MentionContext::new(id, path, query);
                        self.mentions.suggest(&ctx).await
                    }
                    _ => Vec::new(),
                };
                ComposerSuggestResult {
                    context: SuggestContext::Mention,
                    query: query.to_string(),
                    suggestions: Suggestions::Mentions(items),
                }
            }
        }
    }

    // ========================================================================
    // Prepare
    // ========================================================================

    /// Parses the input and resolves its mentions.
    pub async fn prepare(&self, request: &PrepareRequest) -> ComposerParseResult {
        self.prepare_with_commands(request).await.0
    }

    /// Like [`Composer::prepare`], also returning the command set the input
    /// was validated against.
    async fn prepare_with_commands(
        &self,
        request: &PrepareRequest,
    ) -> (ComposerParseResult, CommandRegistry) {
        let workspace_id = request.workspace_id.as_deref();
        let workspace = self.workspace_path(workspace_id);
        let commands = self.refresh_commands(workspace.as_deref()).await;

        let draft = parse_draft(&request.raw_input, &commands);

        let (Some(workspace_id), Some(workspace)) = (workspace_id, workspace) else {
            debug!("Prepare without an active workspace");
            let diagnostics = vec![ComposerDiagnostic::no_workspace(request.raw_input.len())];
            let parse =
                ComposerParseResult::from_draft(&request.raw_input, draft, Vec::new(), diagnostics);
            return (parse, commands);
        };

        let mut mentions = Vec::new();
        let mut diagnostics = Vec::new();
        for query in &draft.mention_queries {
            let resolved = self
                .resolve_mention(workspace_id, &workspace, query, &request.selected_mention_ids)
                .await;
            match resolved {
                Ok(mention) => mentions.push(mention),
                Err(ResolveFailure::OutsideWorkspace) => {
                    diagnostics.push(ComposerDiagnostic::mention_outside_workspace(
                        &query.query,
                        query.start,
                        query.end,
                    ));
                }
                Err(ResolveFailure::Unresolved) => {
                    diagnostics.push(ComposerDiagnostic::mention_unresolved(
                        &query.query,
                        query.start,
                        query.end,
                    ));
                }
            }
        }

        let parse =
            ComposerParseResult::from_draft(&request.raw_input, draft, mentions, diagnostics);
        (parse, commands)
    }

    async fn resolve_mention(
        &self,
        workspace_id: &str,
        workspace: &Path,
        query: &MentionQuery,
        selected_ids: &[String],
    ) -> Result<MentionRef, ResolveFailure> {
        let ctx = MentionContext::new(workspace_id, workspace, query.query.as_str());
        let hint = selected_type(selected_ids, &query.query);
        self.mentions.resolve_with_hint(&ctx, hint).await
    }

    // ========================================================================
    // Execute
    // ========================================================================

    /// Prepares and runs a request.
    ///
    /// When `stream` is given it receives the output as chunks followed by
    /// exactly one end marker, whatever the outcome.
    pub async fn execute(
        &self,
        request: &PrepareRequest,
        stream: Option<StreamSender>,
    ) -> ComposerExecutionResult {
        let guard = StreamGuard::new(stream);
        let (parse, commands) = self.prepare_with_commands(request).await;

        if parse.blocking {
            let blocking: Vec<ComposerDiagnostic> =
                parse.diagnostics.into_iter().filter(|d| d.blocking).collect();
            debug!("Execution blocked by {} diagnostics", blocking.len());
            return ComposerExecutionResult::failed(ExecutionProvider::Local, blocking);
        }

        // Looked up in the request's own snapshot; the shared set may already
        // belong to another workspace.
        let definition = parse.command.as_ref().and_then(|c| commands.get(&c.name));

        match (route(definition.as_ref()), &parse.command) {
            (Route::Local, Some(invocation)) => {
                let model = request.model_override.as_deref();
                let result = local_response(invocation, &commands, model);
                guard.chunk(result.output.as_str());
                result
            }
            _ => {
                let prompt = build_prompt(&parse, definition.as_ref());
                if prompt.trim().is_empty() {
                    return ComposerExecutionResult::failed(
                        ExecutionProvider::ExternalAssistant,
                        vec![ComposerDiagnostic::provider_unavailable(
                            "Nothing to send to the assistant",
                        )],
                    );
                }

                let Some(cwd) = self.workspace_path(request.workspace_id.as_deref()) else {
                    return ComposerExecutionResult::failed(
                        ExecutionProvider::ExternalAssistant,
                        vec![ComposerDiagnostic::provider_unavailable(
                            "The workspace is no longer available",
                        )],
                    );
                };

                let assistant_request = AssistantRequest {
                    cwd,
                    prompt,
                    model_override: request.model_override.clone(),
                };
                info!(
                    "Forwarding {} to the assistant",
                    parse.command.as_ref().map_or("prompt", |c| c.name.as_str())
                );

                match self.bridge.run(&assistant_request, &guard).await {
                    Ok(output) => ComposerExecutionResult::assistant(output),
                    Err(e) => {
                        warn!("Assistant request failed: {}", e);
                        ComposerExecutionResult::failed(
                            ExecutionProvider::ExternalAssistant,
                            vec![e.to_diagnostic()],
                        )
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The mention type selected for `query`, from ids like `file:src/main.rs`.
fn selected_type(selected_ids: &[String], query: &str) -> Option<MentionType> {
    let query = query.trim_end_matches('/');
    selected_ids.iter().find_map(|id| {
        let (prefix, path) = id.split_once(':')?;
        (path.trim_end_matches('/') == query)
            .then(|| MentionType::from_id_prefix(prefix))
            .flatten()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_selected_type() {
        let ids = vec![
            "file:src/main.rs".to_string(),
            "directory:src/".to_string(),
            "mcp:docs:openapi/users".to_string(),
        ];
        assert_eq!(selected_type(&ids, "src/main.rs"), Some(MentionType::File));
        assert_eq!(selected_type(&ids, "src"), Some(MentionType::Directory));
        assert_eq!(selected_type(&ids, "docs:openapi/users"), Some(MentionType::Mcp));
        assert_eq!(selected_type(&ids, "README.md"), None);
        assert_eq!(selected_type(&["bogus:README.md".to_string()], "README.md"), None);
    }
}
