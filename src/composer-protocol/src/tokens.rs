//! Token stream produced by the composer tokenizer.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Kind of a composer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TokenKind {
    Text,
    Command,
    Mention,
}

/// A span of the raw composer input.
///
/// Tokens of one input are contiguous and cover `[0, len)` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerToken {
    pub kind: TokenKind,
    pub raw: String,
    pub start: usize,
    pub end: usize,
}

impl ComposerToken {
    /// Creates a token covering `input[start..end]`.
    pub fn new(kind: TokenKind, input: &str, start: usize, end: usize) -> Self {
        Self {
            kind,
            raw: input[start..end].to_string(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
