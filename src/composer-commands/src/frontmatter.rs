//! Frontmatter parsing for skill documents.
//!
//! The leading `---` block is read as YAML. Only scalar `name` and
//! `description` values are used. Blocks that are not valid YAML fall back
//! to a scan of single-line `key: value` pairs.

use serde_yaml::Value;
use tracing::debug;

/// Metadata extracted from a skill document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Split a document into its frontmatter and body.
///
/// Documents without a leading `---` line, or whose block is never closed,
/// have no frontmatter and the whole document is the body.
pub fn parse_frontmatter(content: &str) -> (Frontmatter, &str) {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return (Frontmatter::default(), content),
    }

    let block_start = content.find('\n').map_or(content.len(), |i| i + 1);
    let mut offset = block_start;

    for line in lines {
        let line_start = offset;
        offset += line.len();
        if line.trim_end() == "---" {
            let block = &content[block_start..line_start];
            return (parse_block(block), &content[offset..]);
        }
    }

    (Frontmatter::default(), content)
}

fn parse_block(block: &str) -> Frontmatter {
    if block.trim().is_empty() {
        return Frontmatter::default();
    }

    match serde_yaml::from_str::<Value>(block) {
        Ok(value) => Frontmatter {
            name: scalar(&value, "name"),
            description: scalar(&value, "description"),
        },
        Err(e) => {
            debug!("Frontmatter is not valid YAML, scanning lines: {}", e);
            scan_lines(block)
        }
    }
}

/// A scalar value under `key`, as trimmed text.
fn scalar(value: &Value, key: &str) -> Option<String> {
    let text = match value.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn scan_lines(block: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::default();

    for line in block.lines() {
        // Indented lines belong to nested values
        if line.starts_with([' ', '\t']) {
            continue;
        }

        let Some((key, value)) = line.trim_end().split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        if value.is_empty() {
            continue;
        }

        match key.trim() {
            "name" => frontmatter.name = Some(value.to_string()),
            "description" => frontmatter.description = Some(value.to_string()),
            _ => {}
        }
    }

    frontmatter
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Normalize a free-form name into a command name.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9_-]` with a
/// single `-`, collapses repeated separators and trims them from both ends.
pub fn normalize_command_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());

    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            name.push(c);
            continue;
        }
        if !name.is_empty() && !name.ends_with(['-', '_']) {
            name.push(if c == '_' { '_' } else { '-' });
        }
    }

    name.trim_end_matches(['-', '_']).to_string()
}

/// First non-empty, non-heading line of a document body.
pub fn first_body_line(body: &str) -> Option<&str> {
    body.lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
}
