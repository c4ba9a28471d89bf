use crate::review::{truncate_chars, Review};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_TOP_K: usize = 5;

/// Comment characters kept in a search hit
pub const COMMENT_PREVIEW_CHARS: usize = 200;

/// Keyword matching stands in for embedding similarity, so hits get a
/// placeholder score drawn from this band.
pub const SIMILARITY_RANGE: Range<f64> = 0.7..1.0;

/// A review matched by a keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: u8,
    pub comment: String,
    /// Creation date, `YYYY-MM-DD`
    pub date: String,
    pub similarity: f64,
}

/// Keyword search over review comments.
///
/// A review matches when any whitespace-separated query word occurs as a
/// substring of its lower-cased comment. Hits are ordered by their
/// placeholder similarity, highest first, and cut to `top_k`.
pub fn search<'a, I, R>(query: &str, reviews: I, top_k: usize, rng: &mut R) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a Review>,
    R: Rng + ?Sized,
{
    let query = query.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = reviews
        .into_iter()
        .filter(|review| {
            let text = review.comment.to_lowercase();
            words.iter().any(|word| text.contains(word))
        })
        .map(|review| SearchResult {
            score: review.score,
            comment: truncate_chars(&review.comment, COMMENT_PREVIEW_CHARS),
            date: review.created_at.format("%Y-%m-%d").to_string(),
            similarity: rng.gen_range(SIMILARITY_RANGE),
        })
        .collect();

    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(top_k);
    results
}
