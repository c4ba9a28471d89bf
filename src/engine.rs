use crate::config::Config;
use crate::dataset::{Dataset, DatasetCache};
use crate::error::ReviewError;
use crate::frequency::{word_frequency, WordCount};
use crate::review::ScoreBand;
use crate::search::{search, SearchResult};
use crate::stats::{
    comment_stats, item_summary, score_distribution, score_summary, seasonality, sentiment_counts,
    temporal_trends, CommentStats, ItemSummary, ScoreDistribution, ScoreSummary, Seasonality,
    SentimentCounts, TemporalTrends,
};
use crate::tokenizer::Tokenizer;
use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

/// Words listed per band in the full report
const REPORT_TOP_WORDS: usize = 20;
/// Words listed per score in the full report
const REPORT_SCORE_WORDS: usize = 10;

/// Score-level overview of the dataset
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub dataset: String,
    pub total_reviews: usize,
    pub commented_reviews: usize,
    pub summary: Option<ScoreSummary>,
    pub distribution: ScoreDistribution,
    pub sentiment: SentimentCounts,
}

/// Top words among commented reviews with one score
#[derive(Debug, Clone, Serialize)]
pub struct ScoreWords {
    pub score: u8,
    pub words: Vec<WordCount>,
}

/// Everything the exploratory report shows
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub overview: Overview,
    pub trends: Option<TemporalTrends>,
    pub seasonality: Seasonality,
    pub comments: CommentStats,
    pub top_words: Vec<WordCount>,
    pub positive_words: Vec<WordCount>,
    pub negative_words: Vec<WordCount>,
    pub words_by_score: Vec<ScoreWords>,
}

/// Analysis entry point over one loaded dataset
pub struct ReviewEngine {
    dataset: Arc<Dataset>,
    tokenizer: Tokenizer,
    top_n: usize,
    top_k: usize,
}

impl ReviewEngine {
    pub fn new(dataset: Arc<Dataset>, tokenizer: Tokenizer) -> Self {
        let config = Config::default();
        Self {
            dataset,
            tokenizer,
            top_n: config.top_n,
            top_k: config.top_k,
        }
    }

    /// Load (or reuse) the configured dataset and apply configured defaults
    pub fn from_config(config: &Config, cache: &DatasetCache) -> Result<Self> {
        let dataset = cache
            .get(&config.dataset_path)
            .with_context(|| format!("failed to load reviews from {}", config.dataset_path.display()))?;
        tracing::debug!(
            path = %dataset.path().display(),
            reviews = dataset.len(),
            "engine using dataset"
        );
        let tokenizer = Tokenizer::new().with_min_len(config.min_token_len);

        Ok(Self::new(dataset, tokenizer).with_limits(config.top_n, config.top_k))
    }

    pub fn with_limits(mut self, top_n: usize, top_k: usize) -> Self {
        self.top_n = top_n;
        self.top_k = top_k;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Most frequent words among commented reviews in `band`
    pub fn word_frequencies(&self, band: ScoreBand, top_n: Option<usize>) -> Vec<WordCount> {
        let comments = self
            .dataset
            .commented()
            .filter(|r| band.contains(r.score))
            .map(|r| Some(r.comment.as_str()));
        word_frequency(&self.tokenizer, comments, top_n.unwrap_or(self.top_n))
    }

    /// Most frequent words among commented reviews with exactly `score`
    pub fn word_frequencies_for_score(
        &self,
        score: u8,
        top_n: Option<usize>,
    ) -> std::result::Result<Vec<WordCount>, ReviewError> {
        if !(1..=5).contains(&score) {
            return Err(ReviewError::InvalidScore(score));
        }
        let comments = self
            .dataset
            .commented()
            .filter(|r| r.score == score)
            .map(|r| Some(r.comment.as_str()));
        Ok(word_frequency(&self.tokenizer, comments, top_n.unwrap_or(self.top_n)))
    }

    /// Top words for every score 1-5, empty where a score has no comments
    pub fn words_by_score(&self, top_n: Option<usize>) -> Vec<ScoreWords> {
        (1..=5u8)
            .map(|score| ScoreWords {
                score,
                words: self.word_frequencies_for_score(score, top_n).unwrap_or_default(),
            })
            .collect()
    }

    /// Keyword search over commented reviews
    pub fn search(&self, query: &str, top_k: Option<usize>) -> Vec<SearchResult> {
        self.search_with_rng(query, top_k, &mut rand::thread_rng())
    }

    pub fn search_with_rng<R: Rng + ?Sized>(
        &self,
        query: &str,
        top_k: Option<usize>,
        rng: &mut R,
    ) -> Vec<SearchResult> {
        let results = search(query, self.dataset.commented(), top_k.unwrap_or(self.top_k), rng);
        tracing::debug!(query, hits = results.len(), "keyword search");
        results
    }

    pub fn overview(&self) -> Overview {
        let reviews = self.dataset.all();
        Overview {
            dataset: self.dataset.path().display().to_string(),
            total_reviews: reviews.len(),
            commented_reviews: self.dataset.commented().count(),
            summary: score_summary(reviews),
            distribution: score_distribution(reviews),
            sentiment: sentiment_counts(reviews),
        }
    }

    pub fn trends(&self) -> Option<TemporalTrends> {
        temporal_trends(self.dataset.all())
    }

    pub fn seasonality(&self, year: Option<i32>) -> Seasonality {
        seasonality(self.dataset.all(), year)
    }

    pub fn comments(&self) -> CommentStats {
        comment_stats(self.dataset.all())
    }

    pub fn item(&self, item_id: &str) -> Option<ItemSummary> {
        item_summary(self.dataset.all(), item_id)
    }

    pub fn report(&self) -> Report {
        Report {
            overview: self.overview(),
            trends: self.trends(),
            seasonality: self.seasonality(None),
            comments: self.comments(),
            top_words: self.word_frequencies(ScoreBand::All, Some(REPORT_TOP_WORDS)),
            positive_words: self.word_frequencies(ScoreBand::Positive, Some(REPORT_TOP_WORDS)),
            negative_words: self.word_frequencies(ScoreBand::Negative, Some(REPORT_TOP_WORDS)),
            words_by_score: self.words_by_score(Some(REPORT_SCORE_WORDS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LoadOptions;
    use crate::review::{parse_timestamp, Review};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> ReviewEngine {
        let at = |s: &str| parse_timestamp(s).unwrap();
        let reviews = vec![
            Review::new(0, 5, "Produto excelente, entrega rápida", at("2018-01-02")),
            Review::new(1, 5, "Excelente qualidade, recomendo o produto", at("2018-01-05")),
            Review::new(2, 1, "Produto com defeito, péssimo atendimento", at("2018-02-01")),
            Review::new(3, 2, "Entrega atrasada e produto errado", at("2018-02-03")),
            Review::new(4, 3, "ok", at("2018-02-04")),
        ];
        let dataset = Dataset::from_reviews(reviews, LoadOptions::default());
        ReviewEngine::new(Arc::new(dataset), Tokenizer::new())
    }

    #[test]
    fn test_word_frequencies_by_band() {
        let engine = engine();

        let all = engine.word_frequencies(ScoreBand::All, Some(1));
        assert_eq!(all, vec![WordCount::from(("produto", 4))]);

        let positive = engine.word_frequencies(ScoreBand::Positive, Some(2));
        assert_eq!(
            positive,
            vec![WordCount::from(("produto", 2)), WordCount::from(("excelente", 2))]
        );

        // the only neutral review is too short to count as commented
        assert!(engine.word_frequencies(ScoreBand::Neutral, None).is_empty());
    }

    #[test]
    fn test_word_frequencies_for_score() -> anyhow::Result<()> {
        let engine = engine();

        let five = engine.word_frequencies_for_score(5, Some(2))?;
        assert_eq!(
            five,
            vec![WordCount::from(("produto", 2)), WordCount::from(("excelente", 2))]
        );

        let two = engine.word_frequencies_for_score(2, None)?;
        assert_eq!(two[0], WordCount::from(("entrega", 1)));
        assert!(two.iter().all(|w| w.word != "defeito"));

        assert!(engine.word_frequencies_for_score(4, None)?.is_empty());
        assert!(matches!(
            engine.word_frequencies_for_score(6, None),
            Err(ReviewError::InvalidScore(6))
        ));
        Ok(())
    }

    #[test]
    fn test_search_uses_commented_reviews() {
        let engine = engine();
        let mut rng = StdRng::seed_from_u64(3);
        let hits = engine.search_with_rng("entrega", None, &mut rng);
        assert_eq!(hits.len(), 2);
        assert!(engine.search("ok", None).is_empty());
    }

    #[test]
    fn test_report() {
        let report = engine().report();
        assert_eq!(report.overview.total_reviews, 5);
        assert_eq!(report.overview.commented_reviews, 4);
        assert_eq!(report.overview.sentiment.negative, 2);
        assert_eq!(report.trends.map(|t| t.monthly.len()), Some(2));
        assert_eq!(report.comments.with_comment, 5);
        assert_eq!(report.negative_words[0].word, "produto");

        let scores: Vec<u8> = report.words_by_score.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.words_by_score[0].words[0].word, "produto");
        assert!(report.words_by_score[2].words.is_empty());
    }
}
