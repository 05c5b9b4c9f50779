//! Cursor context detection and suggestion application.
//!
//! Both functions are pure: they only look at the text and the cursor.
//! Cursor offsets are byte offsets; an offset past the end or inside a
//! multi-byte character is moved back to the nearest character boundary.

use composer_protocol::{CommandDefinition, MentionSuggestion};

use crate::parser::is_mention_boundary;

/// What the operator is typing at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorContext<'a> {
    None,
    /// A `/command` occupying the whole line up to the cursor. `start` is the
    /// offset of the `/`.
    Command { query: &'a str, start: usize },
    /// An `@mention` in progress. `start` is the offset of the `@`.
    Mention { query: &'a str, start: usize },
}

/// The suggestion being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionChoice<'a> {
    /// A command name, without the `/`.
    Command(&'a str),
    /// The text inserted after the `@`.
    Mention(&'a str),
}

impl<'a> From<&'a CommandDefinition> for SuggestionChoice<'a> {
    fn from(def: &'a CommandDefinition) -> Self {
        Self::Command(&def.name)
    }
}

impl<'a> From<&'a MentionSuggestion> for SuggestionChoice<'a> {
    fn from(suggestion: &'a MentionSuggestion) -> Self {
        Self::Mention(&suggestion.value)
    }
}

/// Text and cursor after applying a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSuggestion {
    pub text: String,
    pub cursor: usize,
}

/// Clamps `cursor` into `text` at a character boundary.
pub fn clamp_cursor(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Classifies the text before the cursor.
pub fn classify_cursor(text: &str, cursor: usize) -> CursorContext<'_> {
    let before = &text[..clamp_cursor(text, cursor)];

    if let Some(at) = before.rfind('@') {
        let query = &before[at + 1..];
        if !query.contains(char::is_whitespace)
            && is_mention_boundary(before[..at].chars().next_back())
        {
            return CursorContext::Mention { query, start: at };
        }
    }

    let line = before.trim_start();
    if let Some(query) = line.strip_prefix('/')
        && !query.contains(char::is_whitespace)
    {
        return CursorContext::Command {
            query,
            start: before.len() - line.len(),
        };
    }

    CursorContext::None
}

/// Applies a suggestion at the cursor.
///
/// A command replaces the command typed so far with `/<name> `; a mention
/// replaces the partial query after the `@`. Text after the cursor is kept.
/// Returns `None` when the cursor context does not match the suggestion.
pub fn apply_suggestion(
    raw: &str,
    cursor: usize,
    choice: SuggestionChoice<'_>,
) -> Option<AppliedSuggestion> {
    let cursor = clamp_cursor(raw, cursor);
    let after = &raw[cursor..];

    match (classify_cursor(raw, cursor), choice) {
        (CursorContext::Command { start, .. }, SuggestionChoice::Command(name)) => {
            let mut text = format!("{}/{name}", &raw[..start]);
            let mut new_cursor = text.len();
            match after.chars().next() {
                Some(c) if c.is_whitespace() => new_cursor += c.len_utf8(),
                _ => {
                    text.push(' ');
                    new_cursor += 1;
                }
            }
            text.push_str(after);
            Some(AppliedSuggestion {
                text,
                cursor: new_cursor,
            })
        }
        (CursorContext::Mention { start, .. }, SuggestionChoice::Mention(value)) => {
            let mut text = format!("{}{value}", &raw[..=start]);
            let new_cursor = text.len();
            text.push_str(after);
            Some(AppliedSuggestion {
                text,
                cursor: new_cursor,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_classify_command() {
        assert_eq!(classify_cursor("/", 1), CursorContext::Command { query: "", start: 0 });
        assert_eq!(classify_cursor("  /co", 5), CursorContext::Command { query: "co", start: 2 });
        assert_eq!(classify_cursor("/compact now", 12), CursorContext::None);
        assert_eq!(
            classify_cursor("/compact now", 4),
            CursorContext::Command { query: "com", start: 0 }
        );
        assert_eq!(classify_cursor("say /co", 7), CursorContext::None);
    }

    #[test]
    fn test_classify_mention() {
        assert_eq!(
            classify_cursor("check @sr", 9),
            CursorContext::Mention { query: "sr", start: 6 }
        );
        assert_eq!(
            classify_cursor("/review @src/", 13),
            CursorContext::Mention { query: "src/", start: 8 }
        );
        assert_eq!(classify_cursor("mail a@b", 8), CursorContext::None);
        assert_eq!(classify_cursor("check @src now", 14), CursorContext::None);
        assert_eq!(classify_cursor("", 0), CursorContext::None);
    }

    #[test]
    fn test_cursor_clamped() {
        assert_eq!(clamp_cursor("abc", 99), 3);
        // 'é' occupies bytes 1..3
        assert_eq!(clamp_cursor("héllo", 2), 1);
        assert_eq!(
            classify_cursor("@é", 2),
            CursorContext::Mention { query: "", start: 0 }
        );
    }

    #[test]
    fn test_apply_command() {
        let applied = apply_suggestion("/co", 3, SuggestionChoice::Command("compact")).unwrap();
        assert_eq!(applied.text, "/compact ");
        assert_eq!(applied.cursor, 9);

        let applied = apply_suggestion("/re src", 3, SuggestionChoice::Command("review")).unwrap();
        assert_eq!(applied.text, "/review src");
        assert_eq!(applied.cursor, 8);
    }

    #[test]
    fn test_apply_mention() {
        let choice = SuggestionChoice::Mention("src/main/index.ts");
        let applied = apply_suggestion("check @sr", 9, choice).unwrap();
        assert_eq!(applied.text, "check @src/main/index.ts");
        assert_eq!(applied.cursor, applied.text.len());

        let choice = SuggestionChoice::Mention("README.md");
        let applied = apply_suggestion("see @RE and more", 7, choice).unwrap();
        assert_eq!(applied.text, "see @README.md and more");
        assert_eq!(applied.cursor, 14);
    }

    #[test]
    fn test_apply_mismatch() {
        assert!(apply_suggestion("check @sr", 9, SuggestionChoice::Command("help")).is_none());
        assert!(apply_suggestion("plain", 5, SuggestionChoice::Mention("x")).is_none());
    }
}
