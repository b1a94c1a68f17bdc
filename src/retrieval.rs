/// Returned alone when the knowledge base has documents but none match.
pub const NO_RELEVANT_INFO: &str = "No relevant info found.";

pub const DEFAULT_TOP_K: usize = 3;

/// Lowercase and split on whitespace. Repeated words are kept.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Sum of non-overlapping, case-insensitive substring occurrences of each
/// query word in `doc`.
pub fn score(doc: &str, words: &[String]) -> usize {
    let doc = doc.to_lowercase();
    words.iter().map(|w| doc.matches(w.as_str()).count()).sum()
}

/// Score every document and order by descending score.
///
/// Returns `(score, index)` pairs. The sort is stable, so equal scores keep
/// upload order.
pub fn rank(docs: &[String], query: &str) -> Vec<(usize, usize)> {
    let words = query_words(query);
    let mut scored: Vec<(usize, usize)> = docs
        .iter()
        .enumerate()
        .map(|(idx, doc)| (score(doc, &words), idx))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
}

/// Keyword search over the knowledge base.
///
/// An empty knowledge base yields an empty result; a non-empty one with no
/// matching document yields `[NO_RELEVANT_INFO]`.
pub fn search(docs: &[String], query: &str, top_k: usize) -> Vec<String> {
    if docs.is_empty() {
        return vec![];
    }

    let ranked = rank(docs, query);
    tracing::debug!(?ranked, "keyword scores");

    let hits: Vec<String> = ranked
        .into_iter()
        .filter(|(score, _)| *score > 0)
        .map(|(_, idx)| docs[idx].clone())
        .collect();

    if hits.is_empty() {
        return vec![NO_RELEVANT_INFO.to_string()];
    }
    hits.into_iter().take(top_k).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cat_mat_scenario() {
        let store = docs(&["The cat sat on the mat", "Dogs bark loudly"]);
        assert_eq!(score(&store[0], &query_words("cat mat")), 2);
        assert_eq!(score(&store[1], &query_words("cat mat")), 0);
        assert_eq!(search(&store, "cat mat", 3), vec!["The cat sat on the mat"]);
    }

    #[test]
    fn test_empty_store_returns_nothing() {
        assert!(search(&[], "anything", 3).is_empty());
    }

    #[test]
    fn test_no_match_returns_sentinel() {
        let store = docs(&["hello world"]);
        assert_eq!(search(&store, "zzz", 3), vec![NO_RELEVANT_INFO]);
    }

    #[test]
    fn test_blank_query_returns_sentinel() {
        let store = docs(&["hello world"]);
        assert_eq!(search(&store, "   ", 3), vec![NO_RELEVANT_INFO]);
    }

    #[test]
    fn test_substring_matches_count() {
        // "cat" inside "concatenate" and "category"
        let store = docs(&["concatenate the category"]);
        assert_eq!(score(&store[0], &query_words("cat")), 2);
    }

    #[test]
    fn test_repeated_query_words_add_up() {
        let doc = "rust is fast";
        assert_eq!(score(doc, &query_words("rust")), 1);
        assert_eq!(score(doc, &query_words("rust rust RUST")), 3);
    }

    #[test]
    fn test_case_insensitive() {
        let words = query_words("Cat MAT");
        let doc = "The cat sat on the mat";
        assert_eq!(score(doc, &words), score(&doc.to_uppercase(), &words));
    }

    #[test]
    fn test_more_occurrences_never_lower_score() {
        let words = query_words("apple");
        let mut doc = String::from("an apple a day");
        let mut last = score(&doc, &words);
        for _ in 0..5 {
            doc.push_str(" apple");
            let now = score(&doc, &words);
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_orders_by_score_and_truncates() {
        let store = docs(&[
            "one rust",
            "rust rust rust",
            "nothing here",
            "rust rust",
            "another rust",
        ]);
        let result = search(&store, "rust", 3);
        assert_eq!(result, vec!["rust rust rust", "rust rust", "one rust"]);
    }

    #[test]
    fn test_ties_keep_upload_order() {
        let store = docs(&["b rust", "a rust", "c rust"]);
        assert_eq!(search(&store, "rust", 10), store);
    }

    #[test]
    fn test_result_bounded_by_top_k_and_positive() {
        let store = docs(&["x y", "x", "y", "z", "x x y"]);
        for k in 0..6 {
            let result = search(&store, "x y", k);
            assert!(result.len() <= k);
            let words = query_words("x y");
            assert!(result.iter().all(|d| score(d, &words) > 0));
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let store = docs(&["alpha beta", "beta gamma", "gamma alpha alpha"]);
        assert_eq!(search(&store, "alpha", 2), search(&store, "alpha", 2));
    }
}
