use crate::error::ReviewError;
use crate::tokenizer::word_count;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One row of the reviews CSV, as written by the marketplace export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub review_score: Option<String>,
    #[serde(default)]
    pub review_comment_title: Option<String>,
    #[serde(default)]
    pub review_comment_message: Option<String>,
    #[serde(default)]
    pub review_creation_date: Option<String>,
    #[serde(default)]
    pub review_answer_timestamp: Option<String>,
}

/// Why a record was left out of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidScore,
    InvalidDate,
}

/// A customer review: a 1-5 score plus an optional comment.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    /// Position of the record in the source file
    pub row: usize,
    pub review_id: String,
    /// Product id when the file has one, otherwise the order id
    pub item_id: Option<String>,
    pub score: u8,
    pub title: Option<String>,
    pub comment: String,
    pub created_at: NaiveDateTime,
    pub answered_at: Option<NaiveDateTime>,
    pub comment_length: usize,
    pub word_count: usize,
}

impl Review {
    pub fn new(row: usize, score: u8, comment: impl Into<String>, created_at: NaiveDateTime) -> Self {
        let comment = comment.into();
        Self {
            row,
            review_id: row.to_string(),
            item_id: None,
            score,
            title: None,
            comment_length: comment.chars().count(),
            word_count: word_count(&comment),
            comment,
            created_at,
            answered_at: None,
        }
    }

    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    pub fn from_record(row: usize, record: ReviewRecord) -> Result<Self, Rejection> {
        let score = record
            .review_score
            .as_deref()
            .and_then(parse_score)
            .ok_or(Rejection::InvalidScore)?;
        let created_at = record
            .review_creation_date
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(Rejection::InvalidDate)?;

        let mut review = Review::new(
            row,
            score,
            record.review_comment_message.unwrap_or_default(),
            created_at,
        );
        if let Some(id) = record.review_id.filter(|id| !id.is_empty()) {
            review.review_id = id;
        }
        review.item_id = record.product_id.or(record.order_id).filter(|id| !id.is_empty());
        review.title = record.review_comment_title.filter(|t| !t.is_empty());
        review.answered_at = record.review_answer_timestamp.as_deref().and_then(parse_timestamp);
        Ok(review)
    }

    pub fn has_comment(&self) -> bool {
        self.comment_length > 0
    }

    pub fn date(&self) -> NaiveDate {
        self.created_at.date()
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }
}

/// Scores are integers 1-5; exports sometimes write them as "5.0".
fn parse_score(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let value = raw
        .parse::<u8>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as u8))?;
    (1..=5).contains(&value).then_some(value)
}

/// Parse the timestamp layouts found in the dataset; a bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Cut `text` to `max_chars` characters, marking the cut with "...".
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Sentiment bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// Scores 4 and 5
    Positive,
    /// Score 3
    Neutral,
    /// Scores 1 and 2
    Negative,
    All,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        match score {
            s if s >= 4 => ScoreBand::Positive,
            s if s <= 2 => ScoreBand::Negative,
            _ => ScoreBand::Neutral,
        }
    }

    pub fn contains(self, score: u8) -> bool {
        match self {
            ScoreBand::All => true,
            band => ScoreBand::of(score) == band,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreBand::Positive => "positive",
            ScoreBand::Neutral => "neutral",
            ScoreBand::Negative => "negative",
            ScoreBand::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for ScoreBand {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" => Ok(ScoreBand::Positive),
            "neutral" => Ok(ScoreBand::Neutral),
            "negative" | "neg" => Ok(ScoreBand::Negative),
            "all" | "" => Ok(ScoreBand::All),
            other => Err(ReviewError::InvalidBand(other.to_string())),
        }
    }
}
