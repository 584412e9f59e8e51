//! Topic similarity matching for learning modules.
//!
//! A new topic reuses an existing active module when their significant tokens
//! overlap enough. Tokens are lowercase words longer than three characters
//! after punctuation is stripped, so short function words never count.

use std::collections::BTreeSet;

use database::LearningModule;

/// Minimum token length (exclusive) for a token to be significant.
const MIN_TOKEN_CHARS: usize = 3;

/// Lowercased words longer than three characters, punctuation removed.
pub fn significant_tokens(topic: &str) -> BTreeSet<String> {
    let normalized: String = topic
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    normalized
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Whether two topics describe the same subject.
///
/// Two shared tokens always match. When the smaller topic has at most two
/// significant tokens, one shared token is enough, so short topics like
/// "React hooks" still match.
pub fn topics_match(a: &str, b: &str) -> bool {
    let a = significant_tokens(a);
    let b = significant_tokens(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let shared = a.intersection(&b).count();
    let smaller = a.len().min(b.len());
    shared >= 2 || (smaller <= 2 && shared >= 1)
}

/// First module in `modules` whose topic matches `candidate`.
///
/// `modules` should be ordered by recency; ties go to the earliest entry.
pub fn find_similar<'a>(
    candidate: &str,
    modules: &'a [LearningModule],
) -> Option<&'a LearningModule> {
    modules
        .iter()
        .find(|module| topics_match(candidate, &module.topic))
}
