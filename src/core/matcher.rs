use crate::core::port_index::PortIndex;
use regex::Regex;
use std::collections::HashSet;

/// Acceptance threshold for a single ad-hoc lookup.
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Stricter threshold used when scanning candidate phrases out of full text,
/// where short noise words would otherwise sneak past.
pub const SCAN_THRESHOLD: f64 = 75.0;

/// Weighted fuzzy-string similarity on a 0-100 scale, case-insensitive.
/// Combines the plain edit-distance ratio with a token-sort variant (x0.95)
/// and a best-substring-window variant (x0.90), keeping the maximum. The
/// down-weighted variants let multi-word phrases and embedded names match
/// without letting them outrank an exact hit.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let full = strsim::normalized_levenshtein(&a, &b) * 100.0;
    let token_sort = strsim::normalized_levenshtein(&sorted_tokens(&a), &sorted_tokens(&b))
        * 100.0
        * 0.95;
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a.as_str(), b.as_str())
    } else {
        (b.as_str(), a.as_str())
    };
    let partial = best_window(short, long) * 100.0 * 0.90;

    full.max(token_sort).max(partial)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Best edit-distance ratio of `short` against any equal-length character
/// window of `long`.
fn best_window(short: &str, long: &str) -> f64 {
    let short_chars: Vec<char> = short.chars().collect();
    let long_chars: Vec<char> = long.chars().collect();
    if short_chars.is_empty() {
        return 0.0;
    }
    if short_chars.len() >= long_chars.len() {
        return strsim::normalized_levenshtein(short, long);
    }

    let mut best = 0.0_f64;
    for window in long_chars.windows(short_chars.len()) {
        let window: String = window.iter().collect();
        best = best.max(strsim::normalized_levenshtein(short, &window));
        if best >= 1.0 {
            break;
        }
    }
    best
}

/// Best approximate match of `text` against every registered index token.
/// Returns the matched code and its score when the score clears `threshold`.
/// Ties resolve toward the earliest-registered token. Never fails: empty
/// text or an empty index yield `None`.
pub fn fuzzy_find_port(text: &str, index: &PortIndex, threshold: f64) -> Option<(String, f64)> {
    if text.is_empty() || index.is_empty() {
        return None;
    }

    let query = text.to_lowercase();
    // Exact token hit short-circuits the scan.
    if let Some(code) = index.code_for(&query) {
        return Some((code.to_string(), 100.0));
    }

    let mut best: Option<(&str, f64)> = None;
    for token in index.tokens() {
        let score = similarity(&query, token);
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((token, score));
        }
    }

    let (token, score) = best?;
    if score >= threshold {
        index.code_for(token).map(|code| (code.to_string(), score))
    } else {
        None
    }
}

/// Ordered port codes found in free text, each at most once. Candidate
/// phrases are runs of alphabetic tokens (length >= 2) joined by single
/// whitespace gaps, processed longest-first so a short substring cannot
/// claim a slot before the fuller phrase containing it is tried.
pub fn find_ports_in_text(text: &str, index: &PortIndex) -> Vec<String> {
    let mut found = Vec::new();
    if text.is_empty() || index.is_empty() {
        return found;
    }

    let candidate_re = Regex::new(r"[A-Za-z]{2,}(?:\s+[A-Za-z]{2,})*").unwrap();
    let mut candidates: Vec<&str> = candidate_re.find_iter(text).map(|m| m.as_str()).collect();
    // Stable sort: equal-length candidates keep their text order.
    candidates.sort_by_key(|c| std::cmp::Reverse(c.chars().count()));

    let mut seen: HashSet<String> = HashSet::new();
    for candidate in candidates {
        if let Some((code, _score)) = fuzzy_find_port(candidate, index, SCAN_THRESHOLD) {
            if seen.insert(code.clone()) {
                found.push(code);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PortReferenceEntry;

    fn test_index() -> PortIndex {
        let reference: Vec<PortReferenceEntry> = [
            ("INNSA", "Nhava Sheva"),
            ("INMAA", "Chennai"),
            ("CNSHA", "Shanghai"),
            ("NLRTM", "Rotterdam"),
            ("DEHAM", "Hamburg"),
            ("SGSIN", "Singapore"),
            ("USLAX", "Los Angeles"),
            ("USNYC", "New York"),
        ]
        .iter()
        .map(|(code, name)| PortReferenceEntry {
            code: Some(code.to_string()),
            name: Some(name.to_string()),
        })
        .collect();
        PortIndex::build(&reference)
    }

    #[test]
    fn test_exact_name_scores_100() {
        let index = test_index();
        let (code, score) = fuzzy_find_port("Shanghai", &index, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(code, "CNSHA");
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_near_miss_spelling_resolves() {
        let index = test_index();
        // One deleted letter still clears the threshold.
        let (code, score) = fuzzy_find_port("Roterdam", &index, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(code, "NLRTM");
        assert!(score >= DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_transposed_letters_still_resolve() {
        let index = test_index();
        let (code, score) = fuzzy_find_port("Shangahi", &index, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(code, "CNSHA");
        assert!(score >= DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_unrelated_word_never_matches() {
        let index = test_index();
        assert!(fuzzy_find_port("bananarama", &index, DEFAULT_THRESHOLD).is_none());
        assert!(fuzzy_find_port("quarterly forecast", &index, DEFAULT_THRESHOLD).is_none());
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        let index = test_index();
        assert!(fuzzy_find_port("", &index, DEFAULT_THRESHOLD).is_none());
        assert!(fuzzy_find_port("Shanghai", &PortIndex::default(), DEFAULT_THRESHOLD).is_none());
        assert!(find_ports_in_text("", &index).is_empty());
        assert!(find_ports_in_text("Shanghai", &PortIndex::default()).is_empty());
    }

    #[test]
    fn test_find_ports_orders_by_candidate_length() {
        let index = test_index();
        // Punctuation splits the text into two candidate phrases; the longer
        // one ("From Nhava Sheva") is tried first.
        let found = find_ports_in_text("From Nhava Sheva.\nTo Hamburg.", &index);
        assert_eq!(found, vec!["INNSA".to_string(), "DEHAM".to_string()]);
    }

    #[test]
    fn test_find_ports_registers_each_code_once() {
        let index = test_index();
        let found = find_ports_in_text("Shanghai, Shanghai, and Shanghai again", &index);
        assert_eq!(found, vec!["CNSHA".to_string()]);
    }

    #[test]
    fn test_multi_word_name_matches_inside_phrase() {
        let index = test_index();
        let found = find_ports_in_text("cargo ex Nhava Sheva asap", &index);
        assert_eq!(found, vec!["INNSA".to_string()]);
    }

    #[test]
    fn test_similarity_is_case_insensitive() {
        assert_eq!(similarity("HAMBURG", "hamburg"), 100.0);
    }
}
