//! Fuzzy matching for completions

/// Score `target` against `query`: every query char must appear in order.
///
/// Consecutive matches, matches at the start of a word (after a space,
/// `_`, `-`, `.`, `:` or `@`) and a match on the first char score higher.
/// Returns `None` when the query is not a subsequence of the target.
pub fn fuzzy_match_score(query: &str, target: &str) -> Option<i32> {
    let query_chars: Vec<char> = query.to_lowercase().chars().collect();
    if query_chars.is_empty() {
        return Some(0);
    }

    let mut query_idx = 0;
    let mut score = 0;
    let mut prev_matched = false;
    let mut prev_was_separator = true;

    for (i, tc) in target.to_lowercase().chars().enumerate() {
        let is_separator = matches!(tc, ' ' | '_' | '-' | '.' | ':' | '@');

        if query_idx < query_chars.len() && tc == query_chars[query_idx] {
            score += 1;
            if prev_matched {
                score += 2;
            }
            if prev_was_separator {
                score += 3;
            }
            if i == 0 {
                score += 5;
            }
            query_idx += 1;
            prev_matched = true;
        } else {
            prev_matched = false;
        }

        prev_was_separator = is_separator;
    }

    (query_idx == query_chars.len()).then_some(score)
}

/// Keep the items `score` accepts, best first. Ties keep their original
/// order.
pub fn rank_by<T, F>(items: impl IntoIterator<Item = T>, mut score: F) -> Vec<T>
where
    F: FnMut(&T) -> Option<i32>,
{
    let mut matches: Vec<(T, i32)> = items
        .into_iter()
        .filter_map(|item| score(&item).map(|s| (item, s)))
        .collect();
    matches.sort_by(|a, b| b.1.cmp(&a.1));
    matches.into_iter().map(|(item, _)| item).collect()
}
