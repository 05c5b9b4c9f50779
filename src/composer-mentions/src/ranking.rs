//! Ranking of mention suggestions.
//!
//! Matching is case-insensitive. Candidates whose path starts with the query
//! rank before candidates that merely contain it; order within a tier is
//! preserved.

use composer_protocol::MentionSuggestion;

/// Default number of suggestions returned per list.
pub const MAX_RESULTS: usize = 20;

/// How well a candidate matches a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Prefix,
    Contains,
}

/// Matches a candidate against an already lowercased query.
pub fn match_tier(candidate: &str, query_lower: &str) -> Option<MatchTier> {
    let candidate = candidate.to_lowercase();
    if candidate.starts_with(query_lower) {
        Some(MatchTier::Prefix)
    } else if candidate.contains(query_lower) {
        Some(MatchTier::Contains)
    } else {
        None
    }
}

/// The text a suggestion is ranked on.
pub fn ranking_key(suggestion: &MentionSuggestion) -> &str {
    suggestion
        .relative_path
        .as_deref()
        .unwrap_or(&suggestion.value)
}

/// Filters, orders and caps suggestions for `query`.
pub fn rank_suggestions(
    suggestions: Vec<MentionSuggestion>,
    query: &str,
    limit: usize,
) -> Vec<MentionSuggestion> {
    let query_lower = query.to_lowercase();

    let mut matched: Vec<(MatchTier, MentionSuggestion)> = suggestions
        .into_iter()
        .filter_map(|s| match_tier(ranking_key(&s), &query_lower).map(|tier| (tier, s)))
        .collect();
    matched.sort_by_key(|(tier, _)| *tier);

    matched.into_iter().take(limit).map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use composer_protocol::{MentionType, SuggestionKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn file(path: &str) -> MentionSuggestion {
        MentionSuggestion {
            kind: SuggestionKind::Mention,
            id: format!("file:{path}"),
            display: path.to_string(),
            value: path.to_string(),
            absolute_path: None,
            relative_path: Some(path.to_string()),
            mention_type: MentionType::File,
        }
    }

    fn values(items: &[MentionSuggestion]) -> Vec<&str> {
        items.iter().map(|s| s.value.as_str()).collect()
    }

    #[test]
    fn test_prefix_before_contains() {
        let items = vec![file("lib/app.rs"), file("README.md"), file("app/main.rs")];
        let ranked = rank_suggestions(items, "APP", MAX_RESULTS);
        assert_eq!(values(&ranked), vec!["app/main.rs", "lib/app.rs"]);
    }

    #[test]
    fn test_cap() {
        let items = (0..30).map(|i| file(&format!("f{i}.rs"))).collect();
        assert_eq!(rank_suggestions(items, "", MAX_RESULTS).len(), 20);
    }

    #[test]
    fn test_match_tier() {
        assert_eq!(match_tier("Src/Main.rs", "src"), Some(MatchTier::Prefix));
        assert_eq!(match_tier("lib/src", "src"), Some(MatchTier::Contains));
        assert_eq!(match_tier("lib", "src"), None);
    }
}
