use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures while loading or joining the source files. Any of these is
/// fatal to recommendation attempts for that dataset; the pipeline never
/// proceeds with partial data.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("missing column '{column}' in {path}")]
    MissingColumn { path: String, column: String },

    #[error("malformed record in {path}: {message}")]
    Malformed { path: String, message: String },
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// User-input error, not a system fault: the caller must request more
    /// seed titles rather than invoke the aggregator.
    #[error("invalid selection: {0}")]
    SeedSelection(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::SeedSelection(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Dataset(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
