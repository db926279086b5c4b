use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Invalid stream format: {0}")]
    InvalidStreamFormat(String),
    #[error("Stream normalization produced no samples")]
    EmptySeries,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MalformedManualBounds {
    #[error("Manual trim needs both a start and an end time")]
    Missing,
    #[error("Manual trim bounds must be finite numbers")]
    NotFinite,
    #[error("Manual trim bounds must not be negative")]
    Negative,
    #[error("Manual trim end ({end}s) must be after start ({start}s)")]
    EndNotAfterStart { start: f64, end: f64 },
}

/// Why a proposed trim was discarded in favour of the full recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TrimRejection {
    #[error("Trimmed series is empty")]
    Empty,
    #[error("Trim keeps {retained_percent:.1}% of distance (floor {floor_percent:.0}%)")]
    DistanceRetained { retained_percent: f64, floor_percent: f64 },
    #[error("Trim keeps {seconds:.0}s of recording (floor {floor_seconds:.0}s)")]
    DurationTooShort { seconds: f64, floor_seconds: f64 },
    #[error("Moving pace changes by {change_percent:.0}% ({before:.2} -> {after:.2} m/s)")]
    PaceInconsistent { before: f64, after: f64, change_percent: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Activity has no usable start time")]
    MissingStartTime,
    #[error("Sample time {0}s is outside the exportable range")]
    TimeOutOfRange(f64),
    #[error("TCX generation failed: {0}")]
    Xml(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Trim not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Stream(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Export(ExportError::MissingStartTime | ExportError::TimeOutOfRange(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
