// HTTP API
// Upload form, result page, static/upload file serving and a JSON endpoint

use crate::models::{AnalysisResult, AnalyzeRequest};
use crate::services::analyzer::{AnalysisError, Analyzer};
use crate::services::autopilot::AutopilotRegistry;
use crate::services::config_store::AppConfig;
use crate::services::detection::{DetectionSensitivity, RigorousScorer, UniformityScorer};
use crate::services::templates::{builtin_static, escape_html, render, TemplateStore};
use crate::services::text_processor::Document;
use crate::services::upload_store::{safe_join, StoredUpload, UploadError, UploadStore};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

fn no_file() -> ApiError {
    ApiError::BadRequest("No file uploaded.".to_string())
}

fn save_failed(err: UploadError) -> ApiError {
    warn!(error = %err, "upload.save_failed");
    ApiError::Internal(format!("Failed to save uploaded file: {}", err))
}

fn multipart_failed(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    ApiError::BadRequest(err.body_text())
}

pub struct AppState {
    pub analyzer: Analyzer,
    pub uploads: UploadStore,
    pub templates: TemplateStore,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let autopilots = if config.analysis.autopilot_enabled {
            AutopilotRegistry::default()
        } else {
            AutopilotRegistry::disabled()
        };
        let analyzer = Analyzer::new(
            Box::new(UniformityScorer),
            Box::new(RigorousScorer),
            autopilots,
            DetectionSensitivity::from_str(&config.analysis.sensitivity),
        );

        Self {
            analyzer,
            uploads: UploadStore::new(config.storage.upload_dir.clone()),
            templates: TemplateStore::new(config.storage.templates_dir.clone()),
            static_dir: config.storage.static_dir.clone(),
        }
    }
}

pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/static/{*path}", get(static_file))
        .route("/uploads/{*path}", get(uploaded_file))
        .route("/upload", post(upload_submission).get(page_not_found))
        .route("/api/analyze", post(analyze_text).get(page_not_found))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn page_not_found() -> ApiError {
    ApiError::NotFound("Page not found")
}

async fn fallback(method: Method) -> ApiError {
    if method == Method::POST {
        ApiError::NotFound("Invalid endpoint")
    } else {
        ApiError::NotFound("Page not found")
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    state
        .templates
        .load("index.html")
        .await
        .map(Html)
        .ok_or_else(|| ApiError::Internal("index template missing".to_string()))
}

fn static_content_type(path: &str) -> String {
    let ext = std::path::Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "css" => "text/css".to_string(),
        "js" => "application/javascript".to_string(),
        "png" | "jpg" | "jpeg" | "gif" | "svg" => format!("image/{}", ext),
        _ => "application/octet-stream".to_string(),
    }
}

fn upload_content_type(path: &str) -> &'static str {
    if path.to_ascii_lowercase().ends_with(".txt") {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

async fn static_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let full = safe_join(&state.static_dir, &path).ok_or(ApiError::NotFound("File not found"))?;
    let bytes = match tokio::fs::metadata(&full).await {
        Ok(meta) if meta.is_file() => tokio::fs::read(&full)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        _ => builtin_static(&path)
            .map(|b| b.to_vec())
            .ok_or(ApiError::NotFound("File not found"))?,
    };
    Ok(([(header::CONTENT_TYPE, static_content_type(&path))], bytes).into_response())
}

async fn uploaded_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.uploads.read(&path).await.map_err(|e| match e {
        UploadError::NotFound(_) => ApiError::NotFound("File not found"),
        other => ApiError::Internal(other.to_string()),
    })?;
    Ok(([(header::CONTENT_TYPE, upload_content_type(&path))], bytes).into_response())
}

/// Stream the `submission` field to disk. Other fields are skipped.
async fn store_submission(uploads: &UploadStore, multipart: &mut Multipart) -> Result<StoredUpload, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_failed)? {
        if field.name() != Some("submission") {
            continue;
        }
        let raw_name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(no_file()),
        };

        let mut pending = uploads.begin(&raw_name).await.map_err(|e| match e {
            UploadError::InvalidName(_) => no_file(),
            other => save_failed(other),
        })?;

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = pending.write_chunk(&chunk).await {
                        pending.abort().await;
                        return Err(save_failed(e));
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    pending.abort().await;
                    return Err(multipart_failed(e));
                }
            }
        }

        return pending.finish().await.map_err(save_failed);
    }
    Err(no_file())
}

async fn upload_submission(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let stored = match store_submission(&state.uploads, &mut multipart).await {
        Ok(stored) => stored,
        Err(err) => {
            info!(%request_id, error = %err, "upload.rejected");
            return Err(err);
        }
    };

    let bytes = tokio::fs::read(&stored.path)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let document = Document::from_bytes(Some(&stored.name), bytes);
    let result = state.analyzer.analyze_document(&document)?;

    info!(
        %request_id,
        file = %stored.name,
        bytes = stored.size,
        word_count = result.metrics.word_count,
        sentence_count = result.metrics.sentence_count,
        ai_likelihood = result.ai_likelihood,
        ai_rigorous_score = result.ai_rigorous_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis.completed"
    );

    let template = state
        .templates
        .load("result.html")
        .await
        .ok_or_else(|| ApiError::Internal("result template missing".to_string()))?;
    Ok(Html(render_result(&template, &stored.name, &result)))
}

async fn analyze_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let document = Document::from_text(req.filename.as_deref(), &req.text);
    Ok(Json(state.analyzer.analyze_document(&document)?))
}

// Unreserved URL characters stay literal in a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Fill the result page placeholders
pub fn render_result(template: &str, filename: &str, result: &AnalysisResult) -> String {
    let m = &result.metrics;
    let values: HashMap<&str, String> = HashMap::from([
        ("filename", escape_html(filename)),
        ("file_url", utf8_percent_encode(filename, PATH_SEGMENT).to_string()),
        ("word_count", m.word_count.to_string()),
        ("unique_words", m.unique_word_count.to_string()),
        ("unique_ratio", format!("{:.2}", m.unique_ratio)),
        ("sentence_count", m.sentence_count.to_string()),
        ("avg_sentence_length", format!("{:.2}", m.avg_sentence_length)),
        ("syllable_count", m.syllable_count.to_string()),
        ("flesch_score", format!("{:.2}", m.flesch_reading_ease)),
        ("ai_likelihood", format!("{:.2}", result.ai_likelihood)),
        ("ai_rigorous", format!("{:.2}", result.ai_rigorous_score)),
        ("verdict", result.verdict.clone()),
        ("autopilot_result", escape_html(&result.autopilot_result).replace('\n', "<br/>")),
    ]);
    render(template, &values)
}
