use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::{ApiError, ModelError, UploadError};
use crate::model::{preprocess, Classifier};
use crate::upload::{allowed_file, save_upload};
use crate::verdict::Verdict;
use crate::{flash, pages};

pub struct AppState {
    pub classifier: Mutex<Box<dyn Classifier>>,
    pub threshold: f32,
    pub upload_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/upload", get(upload_page).post(upload_handler))
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
        .route("/", get(home).post(home))
        .route("/aboutus", get(about).post(about))
        .route("/health", get(health_check))
}

#[derive(Serialize)]
struct PredictResponse {
    prediction: &'static str,
    probabilities: Vec<f32>,
    threshold: f32,
}

struct Upload {
    filename: String,
    data: Vec<u8>,
}

/// Pulls the `file` part out of the form, rejecting it the same way for
/// both the HTML and JSON endpoints.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        // a `file` field without a filename is a plain text input
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if filename.is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        if !allowed_file(&filename) {
            return Err(UploadError::InvalidType);
        }

        let data = field.bytes().await?.to_vec();
        return Ok(Upload { filename, data });
    }

    Err(UploadError::NoFilePart)
}

async fn classify(state: &AppState, upload: &Upload) -> Result<(Verdict, Vec<f32>), ModelError> {
    if let Err(err) = save_upload(&state.upload_dir, &upload.filename, &upload.data).await {
        tracing::warn!(error = %err, filename = %upload.filename, "could not save upload");
    }

    let input = preprocess(&upload.data)?;
    let probabilities = {
        let classifier = state.classifier.lock().await;
        classifier.class_probabilities(&input)?
    };

    let verdict = Verdict::from_probabilities(&probabilities, state.threshold);
    tracing::info!(
        filename = %upload.filename,
        ?probabilities,
        verdict = verdict.label(),
        "classified upload"
    );
    Ok((verdict, probabilities))
}

fn flash_redirect(message: &str) -> Response {
    (
        [(header::SET_COOKIE, flash::set_cookie(message))],
        Redirect::to("/upload"),
    )
        .into_response()
}

async fn upload_page(headers: HeaderMap) -> Response {
    match flash::take(&headers) {
        Some(message) => (
            [(header::SET_COOKIE, flash::clear_cookie())],
            Html(pages::upload(None, &[message])),
        )
            .into_response(),
        None => Html(pages::upload(None, &[])).into_response(),
    }
}

async fn upload_handler(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(rejection = %rejection.body_text(), "upload is not a multipart form");
            return flash_redirect(&UploadError::NoFilePart.to_string());
        }
    };

    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(err) => {
            tracing::debug!(error = %err, "rejected upload");
            return flash_redirect(&err.to_string());
        }
    };

    match classify(&state, &upload).await {
        Ok((verdict, _)) => Html(pages::upload(Some(verdict.label()), &[])).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, filename = %upload.filename, "failed to process image");
            let message = format!("Error processing image: {err}");
            Html(pages::upload(None, &[message])).into_response()
        }
    }
}

async fn predict_handler(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection.body_text(), "prediction is not a multipart form");
        ApiError::from(UploadError::NoFilePart)
    })?;
    let upload = read_upload(&mut multipart).await?;
    let (verdict, probabilities) = classify(&state, &upload).await?;

    Ok(Json(PredictResponse {
        prediction: verdict.label(),
        probabilities,
        threshold: state.threshold,
    }))
}

async fn home() -> Html<String> {
    Html(pages::home())
}

async fn about() -> Html<String> {
    Html(pages::about())
}

async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "OK" })))
}
