//! Query expansion into fuzzy variations.

use super::policy::ScoringPolicy;

/// Expand a normalized (trimmed, lowercased) query into search variations.
///
/// The full query always comes first, followed by each sufficiently long
/// word and the synonyms of every word found in the synonym table.
/// Duplicates are dropped, keeping the first occurrence.
#[must_use]
pub fn query_variations(query: &str, policy: &ScoringPolicy) -> Vec<String> {
    let mut variations = vec![query.to_string()];

    for word in query.split_whitespace() {
        if word.chars().count() >= policy.min_word_len {
            push_unique(&mut variations, word);
        }
        for synonym in policy.synonyms_for(word) {
            push_unique(&mut variations, synonym);
        }
    }

    variations
}

fn push_unique(variations: &mut Vec<String>, candidate: &str) {
    if !variations.iter().any(|v| v == candidate) {
        variations.push(candidate.to_string());
    }
}
