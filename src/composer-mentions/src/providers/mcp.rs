//! Remote-resource mentions of the form `server:resource`.
//!
//! Stateless: no index and no filesystem access.

use async_trait::async_trait;
use composer_protocol::{McpPayload, MentionRef, MentionSuggestion, MentionType, SuggestionKind};

use super::{MentionContext, MentionProvider};

/// Splits `server:resource`; both sides must be non-empty.
pub fn parse_mcp_query(query: &str) -> Option<McpPayload> {
    let (server, resource) = query.split_once(':')?;
    let (server, resource) = (server.trim(), resource.trim());
    if server.is_empty() || resource.is_empty() {
        return None;
    }

    Some(McpPayload {
        server: server.to_string(),
        resource: resource.to_string(),
    })
}

fn display(payload: &McpPayload) -> String {
    format!("{}:{}", payload.server, payload.resource)
}

/// Produces a single synthetic suggestion or reference per query.
#[derive(Debug, Clone, Copy, Default)]
pub struct McpProvider;

#[async_trait]
impl MentionProvider for McpProvider {
    fn kind(&self) -> MentionType {
        MentionType::Mcp
    }

    async fn suggest(&self, ctx: &MentionContext) -> Vec<MentionSuggestion> {
        let Some(payload) = parse_mcp_query(&ctx.query) else {
            return Vec::new();
        };

        let display = display(&payload);
        vec![MentionSuggestion {
            kind: SuggestionKind::Mention,
            id: format!("mcp:{display}"),
            value: display.clone(),
            display,
            absolute_path: None,
            relative_path: None,
            mention_type: MentionType::Mcp,
        }]
    }

    async fn resolve(&self, ctx: &MentionContext) -> Option<MentionRef> {
        let payload = parse_mcp_query(&ctx.query)?;
        let display = display(&payload);

        Some(MentionRef {
            id: format!("mcp:{display}"),
            mention_type: MentionType::Mcp,
            workspace_id: ctx.workspace_id.clone(),
            absolute_path: None,
            relative_path: None,
            display,
            payload: Some(payload),
        })
    }
}
