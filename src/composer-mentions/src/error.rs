//! Error types for mention resolution.

/// Why a mention query could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveFailure {
    /// No provider produced a reference.
    #[error("mention could not be resolved")]
    Unresolved,

    /// The target lies outside the workspace root.
    #[error("mention points outside the workspace")]
    OutsideWorkspace,
}
