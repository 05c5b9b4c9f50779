//! Composer Engine - the parse, suggest, prepare and execute pipeline.
//!
//! The engine ties the command registry and the mention providers together
//! behind the [`Composer`] facade:
//!
//! - `suggest` classifies the cursor and returns command or mention
//!   candidates. It never blocks and never fails.
//! - `prepare` tokenizes the input, validates the command and resolves
//!   mentions into a [`ComposerParseResult`](composer_protocol::ComposerParseResult).
//!   Its diagnostics are the only basis for execution decisions.
//! - `execute` prepares the input again and routes it either to a local
//!   handler or to the external assistant, optionally streaming output.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use composer_engine::{CliAssistantBridge, Composer, ComposerConfig, StaticWorkspaces};
//! use composer_protocol::PrepareRequest;
//!
//! let config = ComposerConfig::from_env();
//! let bridge = Arc::new(CliAssistantBridge::from_config(&config.assistant));
//! let workspaces = Arc::new(StaticWorkspaces::new().with("ws", "/path/to/project"));
//! let composer = Composer::new(config, workspaces, bridge);
//!
//! let result = composer
//!     .execute(&PrepareRequest::new("/review @src/lib.rs").with_workspace("ws"), None)
//!     .await;
//! ```

pub mod bridge;
pub mod composer;
pub mod config;
pub mod cursor;
pub mod parser;
pub mod router;
pub mod stream;
pub mod workspace;

// Re-exports
pub use bridge::{
    AssistantBridge, AssistantRequest, BridgeError, CliAssistantBridge, parse_output,
};
pub use composer::Composer;
pub use config::{
    AssistantConfig, ComposerConfig, ConfigError, DEFAULT_ASSISTANT_COMMAND,
    DEFAULT_ASSISTANT_TIMEOUT_SECS, DEFAULT_INDEX_TTL_SECS, MentionsConfig, SkillsConfig,
};
pub use cursor::{
    AppliedSuggestion, CursorContext, SuggestionChoice, apply_suggestion, clamp_cursor,
    classify_cursor,
};
pub use parser::{parse_draft, scan_mentions, split_args};
pub use router::{Route, build_prompt, instruction_for, local_response, route};
pub use stream::{StreamEvent, StreamGuard, StreamReceiver, StreamSender, stream_channel};
pub use workspace::{StaticWorkspaces, WorkspaceResolver};
