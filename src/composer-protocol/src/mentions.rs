//! `@` mention queries, suggestions and resolved references.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Type of a resolved mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MentionType {
    File,
    Directory,
    Image,
    Mcp,
}

impl MentionType {
    /// Parses the type prefix used in mention ids (`file:src/main.rs`).
    pub fn from_id_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "file" => Some(Self::File),
            "directory" => Some(Self::Directory),
            "image" => Some(Self::Image),
            "mcp" => Some(Self::Mcp),
            _ => None,
        }
    }
}

/// An unresolved `@query` occurrence in the composer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionQuery {
    /// Raw text including the `@`.
    pub raw: String,
    /// Text after the `@`.
    pub query: String,
    pub start: usize,
    pub end: usize,
}

/// Discriminator carried by every mention suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    #[default]
    Mention,
}

/// A candidate offered while the operator is typing a mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionSuggestion {
    #[serde(default)]
    pub kind: SuggestionKind,
    pub id: String,
    pub display: String,
    /// Text inserted after the `@`.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    #[serde(rename = "type")]
    pub mention_type: MentionType,
}

/// Server/resource pair carried by remote-resource references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpPayload {
    pub server: String,
    pub resource: String,
}

/// A mention resolved to a stable reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionRef {
    pub id: String,
    #[serde(rename = "type")]
    pub mention_type: MentionType,
    pub workspace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    pub display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<McpPayload>,
}

impl MentionRef {
    /// Label used when listing the reference in a prompt.
    pub fn prompt_label(&self) -> &str {
        self.relative_path.as_deref().unwrap_or(&self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_type_from_prefix() {
        assert_eq!(MentionType::from_id_prefix("image"), Some(MentionType::Image));
        assert_eq!(MentionType::from_id_prefix("folder"), None);
    }

    #[test]
    fn test_mention_suggestion_json_shape() {
        let suggestion = MentionSuggestion {
            kind: SuggestionKind::Mention,
            id: "directory:src/".to_string(),
            display: "src/".to_string(),
            value: "src/".to_string(),
            absolute_path: None,
            relative_path: Some("src/".to_string()),
            mention_type: MentionType::Directory,
        };
        let value = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(value["kind"], "mention");
        assert_eq!(value["type"], "directory");
        assert_eq!(value["relativePath"], "src/");

        let parsed: MentionSuggestion = serde_json::from_value(serde_json::json!({
            "id": "file:a.rs",
            "display": "a.rs",
            "value": "a.rs",
            "type": "file",
        }))
        .unwrap();
        assert_eq!(parsed.kind, SuggestionKind::Mention);
    }

    #[test]
    fn test_mention_ref_json_shape() {
        let mention = MentionRef {
            id: "mcp:docs:openapi/users".to_string(),
            mention_type: MentionType::Mcp,
            workspace_id: "ws".to_string(),
            absolute_path: None,
            relative_path: None,
            display: "docs:openapi/users".to_string(),
            payload: Some(McpPayload {
                server: "docs".to_string(),
                resource: "openapi/users".to_string(),
            }),
        };
        let value = serde_json::to_value(&mention).unwrap();
        assert_eq!(value["type"], "mcp");
        assert_eq!(value["workspaceId"], "ws");
        assert_eq!(value["payload"]["server"], "docs");
        assert!(value.get("absolutePath").is_none());
        assert_eq!(mention.prompt_label(), "docs:openapi/users");
    }
}
