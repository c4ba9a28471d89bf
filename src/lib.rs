// Re-export main components
pub mod api;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod review;
pub mod search;
pub mod stats;
pub mod tokenizer;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{Dataset, DatasetCache, LoadOptions};
pub use engine::{Overview, Report, ReviewEngine};
pub use error::ReviewError;
pub use frequency::{word_frequency, FrequencyTable, WordCount};
pub use review::{Review, ScoreBand};
pub use search::{search, SearchResult};
pub use tokenizer::{normalize, Tokenizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
