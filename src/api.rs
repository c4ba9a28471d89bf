use crate::engine::ReviewEngine;
use crate::error::ReviewError;
use crate::review::ScoreBand;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct WordsRequest {
    #[serde(default)]
    pub band: Option<String>,
    /// Exact score 1-5; takes precedence over `band`
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonalityRequest {
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct WordsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<ScoreBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub words: Vec<crate::frequency::WordCount>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<crate::search::SearchResult>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(err) => {
                let message = format!("{:#}", err);
                tracing::error!("API error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::InvalidBand(_) | ReviewError::InvalidScore(_) => {
                AppError::BadRequest(err.to_string())
            }
            other => AppError::Internal(other.into()),
        }
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn get_stats(State(engine): State<Arc<ReviewEngine>>) -> impl IntoResponse {
    Json(ApiResponse::success(engine.overview()))
}

async fn get_trends(State(engine): State<Arc<ReviewEngine>>) -> impl IntoResponse {
    Json(ApiResponse::success(engine.trends()))
}

async fn get_seasonality(
    State(engine): State<Arc<ReviewEngine>>,
    Query(req): Query<SeasonalityRequest>,
) -> impl IntoResponse {
    Json(ApiResponse::success(engine.seasonality(req.year)))
}

async fn get_comments(State(engine): State<Arc<ReviewEngine>>) -> impl IntoResponse {
    Json(ApiResponse::success(engine.comments()))
}

async fn get_words(
    State(engine): State<Arc<ReviewEngine>>,
    Query(req): Query<WordsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = match req.score {
        Some(score) => WordsResponse {
            band: None,
            score: Some(score),
            words: engine.word_frequencies_for_score(score, req.top)?,
        },
        None => {
            let band: ScoreBand = req.band.as_deref().unwrap_or("all").parse()?;
            WordsResponse {
                band: Some(band),
                score: None,
                words: engine.word_frequencies(band, req.top),
            }
        }
    };

    Ok(Json(ApiResponse::success(response)))
}

async fn search_reviews(
    State(engine): State<Arc<ReviewEngine>>,
    Query(req): Query<SearchRequest>,
) -> impl IntoResponse {
    let results = engine.search(&req.q, req.k);

    Json(ApiResponse::success(SearchResponse {
        total: results.len(),
        query: req.q,
        results,
    }))
}

async fn get_item(
    State(engine): State<Arc<ReviewEngine>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match engine.item(&id) {
        Some(summary) => Ok(Json(ApiResponse::success(summary))),
        None => Err(AppError::NotFound(format!("No reviews found for item '{}'", id))),
    }
}

// ========== Router ==========

pub fn create_router(engine: Arc<ReviewEngine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/trends", get(get_trends))
        .route("/seasonality", get(get_seasonality))
        .route("/comments", get(get_comments))
        .route("/words", get(get_words))
        .route("/search", get(search_reviews))
        .route("/items/:id", get(get_item))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}
