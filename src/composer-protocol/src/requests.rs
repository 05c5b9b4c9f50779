//! Request shapes exposed to the UI layer.

use serde::{Deserialize, Serialize};

/// A suggestion request, sent on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub raw_input: String,
    /// Byte offset of the cursor in `raw_input`.
    pub cursor: usize,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl SuggestRequest {
    pub fn new(raw_input: impl Into<String>, cursor: usize) -> Self {
        Self {
            raw_input: raw_input.into(),
            cursor,
            ..Default::default()
        }
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }
}

/// A prepare or execute request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareRequest {
    pub raw_input: String,
    pub cursor: usize,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Mention ids (`<type>:<relative path>`) the operator picked from suggestions.
    #[serde(default)]
    pub selected_mention_ids: Vec<String>,
    #[serde(default)]
    pub model_override: Option<String>,
}

impl PrepareRequest {
    /// Creates a request with the cursor at the end of the input.
    pub fn new(raw_input: impl Into<String>) -> Self {
        let raw_input = raw_input.into();
        Self {
            cursor: raw_input.len(),
            raw_input,
            ..Default::default()
        }
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn with_selected(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.selected_mention_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }
}
