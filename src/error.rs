use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised while loading the graph or classifying an image.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),
    #[error("tensorflow: {0}")]
    Tensorflow(#[from] tensorflow::Status),
    #[error("operation '{0}' not found in graph")]
    MissingOperation(String),
    #[error("expected {expected} input values, got {actual}")]
    InputSize { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("model file {0} is missing and MODEL_URL is not set")]
    ModelMissing(String),
    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to download {url}: HTTP {status}")]
    DownloadStatus { url: String, status: u16 },
    #[error("invalid GITHUB_TOKEN")]
    InvalidToken,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Problems with the uploaded form itself, before any image work happens.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file part")]
    NoFilePart,
    #[error("No selected file")]
    NoSelectedFile,
    #[error("Invalid file type. Allowed file types are: png, jpg, jpeg, gif")]
    InvalidType,
    #[error("Error processing upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

/// Error body for the JSON prediction endpoint.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unprocessable(String),
    Internal(String),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Decode(_) => {
                ApiError::Unprocessable(format!("Error processing image: {err}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(%message, "prediction failed");
        } else {
            tracing::debug!(%message, "rejected prediction request");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
