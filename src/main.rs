use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsreviews::api::create_router;
use rsreviews::engine::Report;
use rsreviews::frequency::WordCount;
use rsreviews::{Config, DatasetCache, ReviewEngine, ScoreBand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Exploratory analysis of product reviews", long_about = None)]
struct Args {
    /// Reviews CSV (plain or .gz); overrides RSREVIEWS_DATASET
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    /// Comments this long or shorter are ignored for words and search
    #[arg(long, global = true)]
    min_comment_len: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full exploratory report
    Report {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Most frequent words in review comments
    Words {
        /// positive, neutral, negative or all
        #[arg(short, long, default_value = "all")]
        band: ScoreBand,
        /// Only reviews with this exact score (1-5); overrides --band
        #[arg(short, long)]
        score: Option<u8>,
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// Keyword search over review comments
    Search {
        query: String,
        #[arg(short, long)]
        k: Option<usize>,
        /// Seed for reproducible similarity values
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Reviews for one order or product
    Item { id: String },
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn print_words(title: &str, words: &[WordCount]) {
    println!("{}:", title);
    if words.is_empty() {
        println!("  (no words)");
    }
    for word in words {
        println!("  {}: {} times", word.word, word.count);
    }
}

fn print_report(report: &Report) {
    let overview = &report.overview;
    println!("Dataset: {}", overview.dataset);
    println!();
    println!("=== SCORE DISTRIBUTION ===");
    println!(
        "Reviews: {} ({} with a usable comment)",
        overview.total_reviews, overview.commented_reviews
    );
    for count in &overview.distribution.counts {
        println!("Score {}: {} reviews ({:.1}%)", count.score, count.count, count.percentage);
    }
    if let Some(summary) = &overview.summary {
        println!(
            "Mean {:.2} | median {:.1} | mode {} | std dev {:.2}",
            summary.mean, summary.median, summary.mode, summary.std_dev
        );
    }
    if let (Some(most), Some(least)) = (overview.distribution.most_common, overview.distribution.least_common) {
        println!("Most common score: {} | least common score: {}", most, least);
    }
    println!(
        "Sentiment: {} positive, {} neutral, {} negative",
        overview.sentiment.positive, overview.sentiment.neutral, overview.sentiment.negative
    );

    println!();
    println!("=== TEMPORAL TRENDS ===");
    match &report.trends {
        Some(trends) => {
            println!(
                "Period: {} to {}",
                trends.first_date.format("%d/%m/%Y"),
                trends.last_date.format("%d/%m/%Y")
            );
            println!("Days with reviews: {}", trends.active_days);
            println!("Mean reviews per day: {:.1}", trends.mean_per_day);
            println!("Busiest day: {} ({} reviews)", trends.busiest_day.date, trends.busiest_day.count);
            println!("Quietest day: {} ({} reviews)", trends.quietest_day.date, trends.quietest_day.count);
            for month in &trends.monthly {
                println!("  {}: {} reviews, avg score {:.2}", month.period, month.count, month.average_score);
            }
        }
        None => println!("No dated reviews"),
    }

    let season = &report.seasonality;
    println!();
    println!("=== SEASONALITY ===");
    for month in &season.months {
        let name = MONTHS.get(month.month as usize - 1).copied().unwrap_or("?");
        println!("  {}: {} reviews, avg score {:.2}", name, month.count, month.average_score);
    }
    let names = |months: &[u32]| -> String {
        months
            .iter()
            .filter_map(|m| MONTHS.get(*m as usize - 1).copied())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("Above average: {}", names(&season.high_months));
    println!("Below average: {}", names(&season.low_months));

    let comments = &report.comments;
    println!();
    println!("=== COMMENTS ===");
    println!(
        "With comment: {} ({:.1}%) | without: {}",
        comments.with_comment,
        comments.comment_share * 100.0,
        comments.without_comment
    );
    println!(
        "Characters: mean {:.1}, median {:.1} | words: mean {:.1}, median {:.1}",
        comments.mean_length, comments.median_length, comments.mean_words, comments.median_words
    );
    for share in &comments.share_by_score {
        println!("  Score {}: {:.1}% commented", share.score, share.share * 100.0);
    }
    for length in &comments.length_by_score {
        println!(
            "  Score {}: {} comments, length mean {:.1}, median {:.1}",
            length.score, length.comments, length.mean_length, length.median_length
        );
    }

    println!();
    println!("=== WORDS ===");
    print_words("Most frequent words", &report.top_words);
    print_words("Positive reviews (4-5)", &report.positive_words);
    print_words("Negative reviews (1-2)", &report.negative_words);
    for score in &report.words_by_score {
        print_words(&format!("Score {}", score.score), &score.words);
    }
}

fn build_engine(config: &Config) -> Result<ReviewEngine> {
    let cache = DatasetCache::new(config.load_options());
    ReviewEngine::from_config(config, &cache)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = args.dataset {
        config.dataset_path = path;
    }
    if let Some(min) = args.min_comment_len {
        config.min_comment_len = min;
    }

    let engine = build_engine(&config)?;

    match args.command {
        Command::Report { json } => {
            let report = engine.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Words { band, score, top } => match score {
            Some(score) => {
                let words = engine.word_frequencies_for_score(score, top)?;
                print_words(&format!("Most frequent words (score {score})"), &words);
            }
            None => {
                let words = engine.word_frequencies(band, top);
                print_words(&format!("Most frequent words ({band})"), &words);
            }
        },
        Command::Search { query, k, seed } => {
            let results = match seed {
                Some(seed) => engine.search_with_rng(&query, k, &mut StdRng::seed_from_u64(seed)),
                None => engine.search(&query, k),
            };
            println!("Search for \"{}\" found {} reviews", query, results.len());
            println!();
            for hit in results {
                println!("[{}] score {} | similarity {:.3}", hit.date, hit.score, hit.similarity);
                println!("    {}", hit.comment);
            }
        }
        Command::Item { id } => match engine.item(&id) {
            Some(item) => {
                println!("Item: {}", item.item_id);
                println!("Average score: {:.2}/5", item.average_score);
                println!("Reviews: {} ({} with comment)", item.review_count, item.with_comment);
                for review in &item.recent {
                    println!(
                        "  {}* - {}: {}",
                        review.score,
                        review.date,
                        review.comment.as_deref().unwrap_or("(no comment)")
                    );
                }
            }
            None => println!("No reviews found for item: {}", id),
        },
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let addr = config.listen_addr()?;

            let app = create_router(Arc::new(engine));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "server listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
