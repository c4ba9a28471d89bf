//! Descriptive statistics over a set of reviews.
//!
//! Every function here takes a slice of reviews and returns a plain,
//! serializable summary. None of them fail: an empty slice yields empty
//! collections, zeros, or `None` where no meaningful value exists.

use crate::review::{truncate_chars, Review, ScoreBand};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Comment characters shown in an item summary
pub const ITEM_PREVIEW_CHARS: usize = 100;
/// Reviews listed in an item summary
pub const ITEM_RECENT_REVIEWS: usize = 5;
/// How far a month's average must sit from the mean to be called out
pub const SEASONAL_THRESHOLD: f64 = 0.2;

const SCORES: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCount {
    pub score: u8,
    pub count: usize,
    /// Share of all reviews, percent with one decimal
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDistribution {
    pub total: usize,
    pub counts: Vec<ScoreCount>,
    pub most_common: Option<u8>,
    pub least_common: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: u8,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCount {
    /// `YYYY-MM-DD` of the week's Monday, or `YYYY-MM` for months
    pub period: String,
    pub count: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalTrends {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub active_days: usize,
    pub mean_per_day: f64,
    pub busiest_day: DailyCount,
    pub quietest_day: DailyCount,
    pub daily: Vec<DailyCount>,
    pub weekly: Vec<PeriodCount>,
    pub monthly: Vec<PeriodCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStats {
    /// Calendar month, 1-12
    pub month: u32,
    pub count: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seasonality {
    pub year: Option<i32>,
    pub months: Vec<MonthStats>,
    /// Mean of the monthly averages
    pub mean_score: f64,
    pub high_months: Vec<u32>,
    pub low_months: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreShare {
    pub score: u8,
    pub share: f64,
}

/// Comment length among commented reviews with one score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLength {
    pub score: u8,
    pub comments: usize,
    pub mean_length: f64,
    pub median_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentStats {
    pub total: usize,
    pub with_comment: usize,
    pub without_comment: usize,
    /// Fraction of reviews with a comment, 0-1
    pub comment_share: f64,
    pub mean_length: f64,
    pub median_length: f64,
    pub mean_words: f64,
    pub median_words: f64,
    pub share_by_score: Vec<ScoreShare>,
    /// Only scores with at least one comment appear
    pub length_by_score: Vec<ScoreLength>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReview {
    pub score: u8,
    pub date: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item_id: String,
    pub review_count: usize,
    pub average_score: f64,
    pub with_comment: usize,
    pub recent: Vec<ItemReview>,
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average_score<'a, I: IntoIterator<Item = &'a Review>>(reviews: I) -> f64 {
    mean(reviews.into_iter().map(|r| f64::from(r.score)))
}

/// Count and percentage of reviews per score, 1 through 5
pub fn score_distribution(reviews: &[Review]) -> ScoreDistribution {
    let mut counts = [0usize; 5];
    for review in reviews {
        let slot = review
            .score
            .checked_sub(1)
            .and_then(|i| counts.get_mut(usize::from(i)));
        if let Some(slot) = slot {
            *slot += 1;
        }
    }

    let total = reviews.len();
    let counts: Vec<ScoreCount> = SCORES
        .zip(counts)
        .map(|(score, count)| ScoreCount {
            score,
            count,
            percentage: if total == 0 {
                0.0
            } else {
                round1(count as f64 * 100.0 / total as f64)
            },
        })
        .collect();

    // Only scores that occur compete; ties go to the lower score.
    let present = || counts.iter().filter(|c| c.count > 0);
    let most_common = present()
        .fold(None::<&ScoreCount>, |best, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(c),
        })
        .map(|c| c.score);
    let least_common = present()
        .fold(None::<&ScoreCount>, |best, c| match best {
            Some(b) if b.count <= c.count => Some(b),
            _ => Some(c),
        })
        .map(|c| c.score);

    ScoreDistribution {
        total,
        counts,
        most_common,
        least_common,
    }
}

/// Mean, median, mode and sample standard deviation of the scores
pub fn score_summary(reviews: &[Review]) -> Option<ScoreSummary> {
    let distribution = score_distribution(reviews);
    let mode = distribution.most_common?;

    let scores: Vec<f64> = reviews.iter().map(|r| f64::from(r.score)).collect();
    let count = scores.len();
    let avg = mean(scores.iter().copied());
    let std_dev = if count < 2 {
        0.0
    } else {
        let var = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    };

    Some(ScoreSummary {
        count,
        mean: avg,
        median: median(scores),
        mode,
        std_dev,
    })
}

/// Review volume per day, week and month
pub fn temporal_trends(reviews: &[Review]) -> Option<TemporalTrends> {
    let mut daily: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut weekly: BTreeMap<NaiveDate, Vec<&Review>> = BTreeMap::new();
    let mut monthly: BTreeMap<(i32, u32), Vec<&Review>> = BTreeMap::new();

    for review in reviews {
        let date = review.date();
        *daily.entry(date).or_insert(0) += 1;

        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        weekly.entry(monday).or_default().push(review);
        monthly
            .entry((date.year(), date.month()))
            .or_default()
            .push(review);
    }

    let (&first_date, _) = daily.first_key_value()?;
    let (&last_date, _) = daily.last_key_value()?;

    let daily: Vec<DailyCount> = daily
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    // Earliest day wins ties in both directions.
    let mut busiest = &daily[0];
    let mut quietest = &daily[0];
    for day in &daily[1..] {
        if day.count > busiest.count {
            busiest = day;
        }
        if day.count < quietest.count {
            quietest = day;
        }
    }
    let (busiest_day, quietest_day) = (busiest.clone(), quietest.clone());

    let weekly = weekly
        .into_iter()
        .map(|(monday, group)| PeriodCount {
            period: monday.format("%Y-%m-%d").to_string(),
            count: group.len(),
            average_score: average_score(group),
        })
        .collect();
    let monthly = monthly
        .into_iter()
        .map(|((year, month), group)| PeriodCount {
            period: format!("{year:04}-{month:02}"),
            count: group.len(),
            average_score: average_score(group),
        })
        .collect();

    Some(TemporalTrends {
        first_date,
        last_date,
        active_days: daily.len(),
        mean_per_day: reviews.len() as f64 / daily.len() as f64,
        busiest_day,
        quietest_day,
        daily,
        weekly,
        monthly,
    })
}

/// Per calendar month volume and average score, optionally for one year.
///
/// Months whose average sits more than [`SEASONAL_THRESHOLD`] above or below
/// the mean of the monthly averages are listed as high or low.
pub fn seasonality(reviews: &[Review], year: Option<i32>) -> Seasonality {
    let mut by_month: BTreeMap<u32, Vec<&Review>> = BTreeMap::new();
    for review in reviews {
        let date = review.date();
        if year.map_or(true, |y| date.year() == y) {
            by_month.entry(date.month()).or_default().push(review);
        }
    }

    let months: Vec<MonthStats> = by_month
        .into_iter()
        .map(|(month, group)| MonthStats {
            month,
            count: group.len(),
            average_score: average_score(group),
        })
        .collect();

    let mean_score = mean(months.iter().map(|m| m.average_score));
    let pick = |keep: fn(f64, f64) -> bool| -> Vec<u32> {
        months
            .iter()
            .filter(|m| keep(m.average_score, mean_score))
            .map(|m| m.month)
            .collect()
    };
    let high_months = pick(|avg, mean| avg > mean + SEASONAL_THRESHOLD);
    let low_months = pick(|avg, mean| avg < mean - SEASONAL_THRESHOLD);

    Seasonality {
        year,
        months,
        mean_score,
        high_months,
        low_months,
    }
}

/// How many reviews carry a comment and how long those comments are
pub fn comment_stats(reviews: &[Review]) -> CommentStats {
    let commented: Vec<&Review> = reviews.iter().filter(|r| r.has_comment()).collect();
    let total = reviews.len();
    let with_comment = commented.len();

    let share_by_score = SCORES
        .filter_map(|score| {
            let (n, with) = reviews
                .iter()
                .filter(|r| r.score == score)
                .fold((0usize, 0usize), |(n, with), r| (n + 1, with + usize::from(r.has_comment())));
            (n > 0).then(|| ScoreShare {
                score,
                share: with as f64 / n as f64,
            })
        })
        .collect();

    let length_by_score = SCORES
        .filter_map(|score| {
            let lengths: Vec<f64> = commented
                .iter()
                .filter(|r| r.score == score)
                .map(|r| r.comment_length as f64)
                .collect();
            (!lengths.is_empty()).then(|| ScoreLength {
                score,
                comments: lengths.len(),
                mean_length: mean(lengths.iter().copied()),
                median_length: median(lengths),
            })
        })
        .collect();

    let lengths: Vec<f64> = commented.iter().map(|r| r.comment_length as f64).collect();
    let words: Vec<f64> = commented.iter().map(|r| r.word_count as f64).collect();

    CommentStats {
        total,
        with_comment,
        without_comment: total - with_comment,
        comment_share: if total == 0 {
            0.0
        } else {
            with_comment as f64 / total as f64
        },
        mean_length: mean(lengths.iter().copied()),
        median_length: median(lengths),
        mean_words: mean(words.iter().copied()),
        median_words: median(words),
        share_by_score,
        length_by_score,
    }
}

/// Reviews per sentiment bucket, judged by score alone
pub fn sentiment_counts(reviews: &[Review]) -> SentimentCounts {
    reviews
        .iter()
        .fold(SentimentCounts::default(), |mut counts, review| {
            match review.band() {
                ScoreBand::Positive => counts.positive += 1,
                ScoreBand::Negative => counts.negative += 1,
                _ => counts.neutral += 1,
            }
            counts
        })
}

/// Reviews for one order or product, `None` when the item has none
pub fn item_summary(reviews: &[Review], item_id: &str) -> Option<ItemSummary> {
    let matching: Vec<&Review> = reviews
        .iter()
        .filter(|r| r.item_id.as_deref() == Some(item_id))
        .collect();
    if matching.is_empty() {
        return None;
    }

    let recent = matching
        .iter()
        .take(ITEM_RECENT_REVIEWS)
        .map(|r| ItemReview {
            score: r.score,
            date: r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            comment: r
                .has_comment()
                .then(|| truncate_chars(&r.comment, ITEM_PREVIEW_CHARS)),
        })
        .collect();

    Some(ItemSummary {
        item_id: item_id.to_string(),
        review_count: matching.len(),
        average_score: average_score(matching.iter().copied()),
        with_comment: matching.iter().filter(|r| r.has_comment()).count(),
        recent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::parse_timestamp;

    fn review(score: u8, date: &str, comment: &str) -> Review {
        Review::new(0, score, comment, parse_timestamp(date).unwrap())
    }

    fn sample() -> Vec<Review> {
        vec![
            review(5, "2018-01-01", "Ótimo, chegou rápido"),
            review(5, "2018-01-01", ""),
            review(4, "2018-01-03", "bom"),
            review(1, "2018-01-08", "Não recebi o produto até agora"),
            review(5, "2018-02-14", ""),
            review(3, "2018-02-20", "mais ou menos"),
        ]
    }

    #[test]
    fn test_score_distribution() {
        let dist = score_distribution(&sample());
        assert_eq!(dist.total, 6);
        let counts: Vec<usize> = dist.counts.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 0, 1, 1, 3]);
        assert_eq!(dist.counts[4].percentage, 50.0);
        assert_eq!(dist.counts[0].percentage, 16.7);
        assert_eq!(dist.most_common, Some(5));
        // 1, 3 and 4 tie at one review each
        assert_eq!(dist.least_common, Some(1));

        let sum: f64 = dist.counts.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_score_summary() {
        let summary = score_summary(&sample()).unwrap();
        assert_eq!(summary.count, 6);
        assert!((summary.mean - 23.0 / 6.0).abs() < 1e-9);
        assert_eq!(summary.median, 4.5);
        assert_eq!(summary.mode, 5);
        assert!((summary.std_dev - 1.602_082).abs() < 1e-5);

        assert!(score_summary(&[]).is_none());
        let single = score_summary(&[review(2, "2018-01-01", "")]).unwrap();
        assert_eq!(single.std_dev, 0.0);
    }

    #[test]
    fn test_temporal_trends() {
        let trends = temporal_trends(&sample()).unwrap();
        assert_eq!(trends.first_date.to_string(), "2018-01-01");
        assert_eq!(trends.last_date.to_string(), "2018-02-20");
        assert_eq!(trends.active_days, 5);
        assert!((trends.mean_per_day - 1.2).abs() < 1e-9);
        assert_eq!(trends.busiest_day.date.to_string(), "2018-01-01");
        assert_eq!(trends.busiest_day.count, 2);
        assert_eq!(trends.quietest_day.date.to_string(), "2018-01-03");

        // 2018-01-01 is a Monday
        let weeks: Vec<(&str, usize)> = trends
            .weekly
            .iter()
            .map(|w| (w.period.as_str(), w.count))
            .collect();
        assert_eq!(
            weeks,
            vec![("2018-01-01", 3), ("2018-01-08", 1), ("2018-02-12", 1), ("2018-02-19", 1)]
        );

        let months: Vec<(&str, usize, f64)> = trends
            .monthly
            .iter()
            .map(|m| (m.period.as_str(), m.count, m.average_score))
            .collect();
        assert_eq!(months, vec![("2018-01", 4, 3.75), ("2018-02", 2, 4.0)]);

        assert!(temporal_trends(&[]).is_none());
    }

    #[test]
    fn test_seasonality() {
        let mut reviews = sample();
        reviews.push(review(1, "2017-03-05", "chegou quebrado"));

        let all = seasonality(&reviews, None);
        let months: Vec<u32> = all.months.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 2, 3]);
        // averages 3.75, 4.0, 1.0 around a mean of 2.9166
        assert_eq!(all.high_months, vec![1, 2]);
        assert_eq!(all.low_months, vec![3]);

        let only_2018 = seasonality(&reviews, Some(2018));
        assert_eq!(only_2018.months.len(), 2);
        assert!(seasonality(&reviews, Some(2010)).months.is_empty());
    }

    #[test]
    fn test_comment_stats() {
        let stats = comment_stats(&sample());
        assert_eq!(stats.with_comment, 4);
        assert_eq!(stats.without_comment, 2);
        assert!((stats.comment_share - 4.0 / 6.0).abs() < 1e-9);
        // word counts 3, 1, 6, 3
        assert_eq!(stats.mean_words, 3.25);
        assert_eq!(stats.median_words, 3.0);

        let five = stats.share_by_score.iter().find(|s| s.score == 5).unwrap();
        assert!((five.share - 1.0 / 3.0).abs() < 1e-9);
        assert!(stats.share_by_score.iter().all(|s| s.score != 2));

        let empty = comment_stats(&[]);
        assert!(empty.length_by_score.is_empty());
        assert_eq!(empty.total, 0);
        assert_eq!(empty.mean_length, 0.0);
    }

    #[test]
    fn test_comment_length_by_score() {
        let reviews = vec![
            review(5, "2018-01-01", "ótimo"),
            review(5, "2018-01-02", "chegou rápido"),
            review(5, "2018-01-03", ""),
            review(1, "2018-01-04", "não recebi o produto"),
        ];
        let stats = comment_stats(&reviews);

        let scores: Vec<u8> = stats.length_by_score.iter().map(|l| l.score).collect();
        assert_eq!(scores, vec![1, 5]);

        let one = &stats.length_by_score[0];
        assert_eq!(one.comments, 1);
        assert_eq!(one.mean_length, 20.0);
        assert_eq!(one.median_length, 20.0);

        // lengths 5 and 13; the review without a comment is left out
        let five = &stats.length_by_score[1];
        assert_eq!(five.comments, 2);
        assert_eq!(five.mean_length, 9.0);
        assert_eq!(five.median_length, 9.0);
    }

    #[test]
    fn test_sentiment_counts() {
        assert_eq!(
            sentiment_counts(&sample()),
            SentimentCounts {
                positive: 4,
                neutral: 1,
                negative: 1
            }
        );
    }

    #[test]
    fn test_item_summary() {
        let long = "a".repeat(120);
        let reviews = vec![
            review(4, "2018-01-01 10:00:00", &long).with_item("p1"),
            review(2, "2018-01-02 11:00:00", "").with_item("p1"),
            review(5, "2018-01-03 12:00:00", "outro").with_item("p2"),
        ];

        let summary = item_summary(&reviews, "p1").unwrap();
        assert_eq!(summary.review_count, 2);
        assert_eq!(summary.average_score, 3.0);
        assert_eq!(summary.with_comment, 1);
        assert_eq!(summary.recent[0].date, "2018-01-01 10:00:00");
        assert_eq!(summary.recent[0].comment.as_deref().map(str::len), Some(103));
        assert_eq!(summary.recent[1].comment, None);

        assert!(item_summary(&reviews, "nope").is_none());
    }
}
