use crate::error::{Result, ReviewError};
use crate::review::{Rejection, Review, ReviewRecord};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

/// Comments this short or shorter are treated as "no real comment".
pub const DEFAULT_MIN_COMMENT_LEN: usize = 10;

const REQUIRED_COLUMNS: &[&str] = &["review_score", "review_creation_date"];

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub min_comment_len: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            min_comment_len: DEFAULT_MIN_COMMENT_LEN,
        }
    }
}

/// The reviews of one CSV file. Read-only once loaded.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    reviews: Vec<Review>,
    min_comment_len: usize,
    skipped_scores: usize,
    skipped_dates: usize,
}

impl Dataset {
    /// Load a reviews CSV; `.gz` files are decompressed on the fly.
    pub fn load<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let start = Instant::now();

        let file = File::open(&path).map_err(|source| ReviewError::Io {
            path: path.clone(),
            source,
        })?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let dataset = Self::from_reader(reader, &path, options)?;
        tracing::info!(
            path = %path.display(),
            reviews = dataset.reviews.len(),
            commented = dataset.commented().count(),
            skipped = dataset.skipped(),
            elapsed = ?start.elapsed(),
            "loaded reviews dataset"
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader; `path` is only used in diagnostics.
    pub fn from_reader<R: Read>(reader: R, path: &Path, options: LoadOptions) -> Result<Self> {
        let csv_error = |source: csv::Error| ReviewError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader.headers().map_err(csv_error)?.clone();
        for &column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h.trim_start_matches('\u{feff}') == column) {
                return Err(ReviewError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                });
            }
        }

        let mut dataset = Self::from_reviews(Vec::new(), options);
        dataset.path = path.to_path_buf();

        for (row, record) in csv_reader.deserialize::<ReviewRecord>().enumerate() {
            let record = record.map_err(csv_error)?;
            match Review::from_record(row, record) {
                Ok(review) => dataset.reviews.push(review),
                Err(Rejection::InvalidScore) => {
                    tracing::debug!(row, "skipping review with invalid score");
                    dataset.skipped_scores += 1;
                }
                Err(Rejection::InvalidDate) => {
                    tracing::debug!(row, "skipping review with invalid creation date");
                    dataset.skipped_dates += 1;
                }
            }
        }

        Ok(dataset)
    }

    /// Build a dataset from reviews already in memory
    pub fn from_reviews(reviews: Vec<Review>, options: LoadOptions) -> Self {
        Self {
            path: PathBuf::new(),
            reviews,
            min_comment_len: options.min_comment_len,
            skipped_scores: 0,
            skipped_dates: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every review with a valid score and creation date
    pub fn all(&self) -> &[Review] {
        &self.reviews
    }

    /// Reviews whose comment is longer than the configured minimum
    pub fn commented(&self) -> impl Iterator<Item = &Review> + '_ {
        self.reviews
            .iter()
            .filter(move |r| r.comment_length > self.min_comment_len)
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Rows dropped while loading
    pub fn skipped(&self) -> usize {
        self.skipped_scores + self.skipped_dates
    }
}

/// Read-through cache of loaded datasets keyed by canonical path.
///
/// A path is loaded once and shared for the life of the cache; entries are
/// never invalidated.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: RwLock<HashMap<PathBuf, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        let key = path.canonicalize().map_err(|source| ReviewError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(dataset) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(dataset));
        }

        let loaded = Arc::new(Dataset::load(&key, self.options)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded the same path meanwhile; keep theirs.
        Ok(Arc::clone(entries.entry(key).or_insert(loaded)))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
