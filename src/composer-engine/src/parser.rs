//! Composer tokenizer.
//!
//! Turns raw composer text into a [`ComposerParseDraft`]:
//!
//! - A leading `/name` (after optional whitespace) is the command; the rest of
//!   the text is split into shell-like arguments.
//! - `@query` occurrences at a word boundary are mention queries.
//! - Command and mention spans are merged with literal text tokens covering
//!   every gap, so the tokens tile the input exactly.
//!
//! Parsing is pure: mentions are only located here, resolution happens in the
//! prepare stage.

use composer_commands::CommandRegistry;
use composer_protocol::{
    CommandInvocation, ComposerDiagnostic, ComposerParseDraft, ComposerToken, MentionQuery,
    TokenKind,
};

/// Characters that may precede an `@` for it to start a mention.
const MENTION_OPENERS: &[char] = &['(', '[', '{', ','];

/// Trailing punctuation that ends a sentence rather than a mention.
const MENTION_TRAILING: &[char] = &['.', ',', ')', ']', '}', ';', ':', '!', '?'];

// ============================================================
// ARGUMENTS
// ============================================================

/// Splits an argument string on whitespace, honoring single and double quotes.
///
/// Quote characters are consumed. An unterminated quote runs to the end of
/// the input. Inside quotes, `\"`, `\'` and `\\` escape the next character.
pub fn split_args(args_str: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted = false;
    let mut chars = args_str.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quote) {
            ('"' | '\'', None) => {
                quote = Some(c);
                quoted = true;
            }
            (c, Some(open)) if c == open => quote = None,
            ('\\', Some(_)) => match chars.peek() {
                Some(&next @ ('"' | '\'' | '\\')) => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            (c, None) if c.is_whitespace() => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    args
}

// ============================================================
// MENTIONS
// ============================================================

/// True if an `@` preceded by `prev` starts a mention.
pub fn is_mention_boundary(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || MENTION_OPENERS.contains(&c),
    }
}

/// Finds every `@query` in `input`, in order.
pub fn scan_mentions(input: &str) -> Vec<MentionQuery> {
    let mut mentions = Vec::new();
    let mut prev: Option<char> = None;
    let mut pos = 0;

    while pos < input.len() {
        let Some(c) = input[pos..].chars().next() else {
            break;
        };

        if c == '@' && is_mention_boundary(prev) {
            let body_start = pos + 1;
            let body_end = input[body_start..]
                .find(char::is_whitespace)
                .map_or(input.len(), |i| body_start + i);
            let query = input[body_start..body_end].trim_end_matches(MENTION_TRAILING);

            if !query.is_empty() {
                let end = body_start + query.len();
                mentions.push(MentionQuery {
                    raw: input[pos..end].to_string(),
                    query: query.to_string(),
                    start: pos,
                    end,
                });
            }

            // The rest of the run cannot start another mention
            prev = input[..body_end].chars().next_back();
            pos = body_end;
            continue;
        }

        prev = Some(c);
        pos += c.len_utf8();
    }

    mentions
}

// ============================================================
// DRAFT
// ============================================================

/// Tokenizes `input` and validates its command against `registry`.
pub fn parse_draft(input: &str, registry: &CommandRegistry) -> ComposerParseDraft {
    let mut specials: Vec<ComposerToken> = Vec::new();
    let mut diagnostics = Vec::new();

    let command = parse_command(input, registry, &mut diagnostics);
    let command_end = command.as_ref().map_or(0, |(token, _)| token.end);

    let mention_queries: Vec<MentionQuery> = scan_mentions(input)
        .into_iter()
        .filter(|m| m.start >= command_end)
        .collect();

    let command = command.map(|(token, invocation)| {
        specials.push(token);
        invocation
    });
    specials.extend(
        mention_queries
            .iter()
            .map(|m| ComposerToken::new(TokenKind::Mention, input, m.start, m.end)),
    );
    specials.sort_by_key(|t| t.start);

    ComposerParseDraft {
        tokens: fill_text_tokens(input, specials),
        command,
        mention_queries,
        diagnostics,
        normalized_prompt: input.trim().to_string(),
    }
}

/// Parses a leading slash command into its token and invocation.
fn parse_command(
    input: &str,
    registry: &CommandRegistry,
    diagnostics: &mut Vec<ComposerDiagnostic>,
) -> Option<(ComposerToken, CommandInvocation)> {
    let start = input.len() - input.trim_start().len();
    let end = input.trim_end().len();
    if !input[start..].starts_with('/') {
        return None;
    }

    let name_start = start + 1;
    let name_end = input[name_start..end]
        .find(char::is_whitespace)
        .map_or(end, |i| name_start + i);
    let name = input[name_start..name_end].to_lowercase();
    let args = split_args(input[name_end..end].trim());

    let invocation = CommandInvocation {
        name,
        args,
        raw: input[start..end].to_string(),
        start,
        end,
    };

    match registry.get(&invocation.name) {
        None => diagnostics.push(ComposerDiagnostic::unknown_command(
            &invocation.name,
            start,
            name_end,
        )),
        Some(def) => {
            if !def.allow_flags
                && let Some(flag) = invocation.flags().next()
            {
                diagnostics.push(ComposerDiagnostic::unsupported_flag(
                    &def.name, flag, start, end,
                ));
            }
            if !def.accepts_arg_count(invocation.args.len()) {
                diagnostics.push(ComposerDiagnostic::invalid_args(&def.syntax, start, end));
            }
        }
    }

    let token = ComposerToken::new(TokenKind::Command, input, start, name_end);
    Some((token, invocation))
}

/// Interleaves text tokens with the sorted special tokens.
fn fill_text_tokens(input: &str, specials: Vec<ComposerToken>) -> Vec<ComposerToken> {
    let mut tokens = Vec::with_capacity(specials.len() * 2 + 1);
    let mut cursor = 0;

    for token in specials {
        if token.start > cursor {
            tokens.push(ComposerToken::new(TokenKind::Text, input, cursor, token.start));
        }
        cursor = token.end;
        tokens.push(token);
    }
    if cursor < input.len() {
        tokens.push(ComposerToken::new(TokenKind::Text, input, cursor, input.len()));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use composer_protocol::DiagnosticCode;
    use pretty_assertions::assert_eq;

    use super::*;

    fn queries(input: &str) -> Vec<String> {
        scan_mentions(input).into_iter().map(|m| m.query).collect()
    }

    fn codes(draft: &ComposerParseDraft) -> Vec<DiagnosticCode> {
        draft.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("a b  c"), vec!["a", "b", "c"]);
        assert_eq!(split_args(r#""hello world" 'x y' z"#), vec!["hello world", "x y", "z"]);
        assert_eq!(split_args(r#"say "unterminated rest"#), vec!["say", "unterminated rest"]);
        assert_eq!(split_args(r#""a \"b\"""#), vec![r#"a "b""#]);
        assert_eq!(split_args(r#""" x"#), vec!["", "x"]);
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_scan_mentions() {
        assert_eq!(queries("summarize @src/components/"), vec!["src/components/"]);
        assert_eq!(queries("inspect @docs:openapi/users"), vec!["docs:openapi/users"]);
        assert!(queries("email me at a@b.com").is_empty());
        assert_eq!(queries("see (@a.rs, @b.rs)."), vec!["a.rs", "b.rs"]);
        assert_eq!(queries("@x @ @y!"), vec!["x", "y"]);

        let mention = &scan_mentions("look at @café.md now")[0];
        assert_eq!(mention.raw, "@café.md");
        assert_eq!(&"look at @café.md now"[mention.start..mention.end], "@café.md");
    }

    #[test]
    fn test_plain_text_has_no_command() {
        let registry = CommandRegistry::new();
        for input in ["hello /help", "", "   ", "fix @src/main.rs please"] {
            let draft = parse_draft(input, &registry);
            assert!(draft.command.is_none());
            assert!(draft.diagnostics.is_empty());
        }
    }

    #[test]
    fn test_tokens_tile_input() {
        let registry = CommandRegistry::new();
        let input = "  /review @src/lib.rs and @docs/ ";
        let draft = parse_draft(input, &registry);

        let kinds: Vec<_> = draft.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Text,
                TokenKind::Command,
                TokenKind::Text,
                TokenKind::Mention,
                TokenKind::Text,
                TokenKind::Mention,
                TokenKind::Text,
            ]
        );
        let joined: String = draft.tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(joined, input);
        assert_eq!(draft.tokens[1].raw, "/review");
        assert_eq!(draft.normalized_prompt, "/review @src/lib.rs and @docs/");
    }

    #[test]
    fn test_command_invocation() {
        let registry = CommandRegistry::new();
        let draft = parse_draft(" /Compact keep \"the summary\" short ", &registry);

        let command = draft.command.unwrap();
        assert_eq!(command.name, "compact");
        assert_eq!(command.args, vec!["keep", "the summary", "short"]);
        assert_eq!(command.raw, "/Compact keep \"the summary\" short");
        assert_eq!((command.start, command.end), (1, 34));
        assert!(draft.diagnostics.is_empty());
    }

    #[test]
    fn test_command_diagnostics() {
        let registry = CommandRegistry::new();

        let draft = parse_draft("/nope arg", &registry);
        assert_eq!(codes(&draft), vec![DiagnosticCode::CmdUnknown]);
        assert_eq!((draft.diagnostics[0].start, draft.diagnostics[0].end), (0, 5));
        assert!(draft.diagnostics[0].blocking);

        let draft = parse_draft("/clear now", &registry);
        assert_eq!(codes(&draft), vec![DiagnosticCode::CmdInvalidArgs]);
        assert!(draft.diagnostics[0].message.contains("/clear"));

        let draft = parse_draft("/clear --force", &registry);
        assert_eq!(
            codes(&draft),
            vec![DiagnosticCode::CmdUnsupportedFlag, DiagnosticCode::CmdInvalidArgs]
        );

        let draft = parse_draft("/review --fast src", &registry);
        assert!(draft.diagnostics.is_empty());
    }

    #[test]
    fn test_free_text_command_accepts_long_instructions() {
        let registry = CommandRegistry::new();
        let input = "/review please check the error handling in the parser and the tests";
        let draft = parse_draft(input, &registry);

        assert!(draft.diagnostics.is_empty());
        assert_eq!(draft.command.unwrap().args.len(), 11);

        let long = format!("/compact {}", "keep this ".repeat(100));
        assert!(parse_draft(&long, &registry).diagnostics.is_empty());
    }
}
