use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, StreamError};
use crate::pipeline::tcx;
use crate::pipeline::trim::{trim_activity, TrimRequest};
use crate::state::AppState;
use crate::types::activity::{ActivityMetadata, ActivityMetrics};
use crate::types::streams::RawStreams;
use crate::types::trim::{DetectionTrace, StopCandidate, TrimOutcome, TrimSource, TrimWarning};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/trim", post(trim))
        .route("/api/trim/:trim_id/tcx", get(export_tcx))
}

/// Streams stay untyped until the handler so a bad shape surfaces as an
/// invalid-stream error instead of a generic body rejection.
#[derive(Deserialize)]
struct TrimBody {
    streams: Value,
    activity: ActivityMetadata,
    corrected_distance_meters: Option<f64>,
    manual_start_time_seconds: Option<f64>,
    manual_end_time_seconds: Option<f64>,
}

impl TrimBody {
    fn into_request(self) -> Result<TrimRequest, StreamError> {
        let streams: RawStreams = serde_json::from_value(self.streams)
            .map_err(|err| StreamError::InvalidStreamFormat(err.to_string()))?;
        Ok(TrimRequest {
            streams,
            activity: self.activity,
            corrected_distance_meters: self.corrected_distance_meters,
            manual_start_time_seconds: self.manual_start_time_seconds,
            manual_end_time_seconds: self.manual_end_time_seconds,
        })
    }
}

#[derive(Serialize)]
struct TrimResponse {
    trim_id: String,
    trim_applied: bool,
    source: TrimSource,
    start_index: Option<usize>,
    end_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_reason: Option<String>,
    warnings: Vec<TrimWarning>,
    interval_pattern: bool,
    candidates: Vec<StopCandidate>,
    metrics: ActivityMetrics,
}

async fn trim(
    State(state): State<AppState>,
    Json(body): Json<TrimBody>,
) -> Result<Json<TrimResponse>, AppError> {
    let request = body.into_request()?;
    if let Some(distance) = request.corrected_distance_meters {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(AppError::BadRequest(
                "corrected_distance_meters must be a positive number".to_string(),
            ));
        }
    }

    let outcome = trim_activity(&request)?;
    log_outcome(&request.activity.name, &outcome);

    let trim_id = Uuid::new_v4().to_string();
    let response = TrimResponse {
        trim_id: trim_id.clone(),
        trim_applied: outcome.trim_applied,
        source: outcome.plan.source,
        start_index: outcome.plan.start_index,
        end_index: outcome.plan.end_index,
        fallback_reason: outcome.fallback.map(|rejection| rejection.to_string()),
        warnings: outcome.warnings.clone(),
        interval_pattern: outcome.trace.interval_pattern,
        candidates: outcome.trace.candidates.clone(),
        metrics: outcome.metrics.clone(),
    };
    state.insert(trim_id, outcome, request.activity);

    Ok(Json(response))
}

async fn export_tcx(
    State(state): State<AppState>,
    Path(trim_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cached = state
        .get(&trim_id)
        .ok_or_else(|| AppError::NotFound(trim_id.clone()))?;

    let document = tcx::export_outcome(&cached.outcome, &cached.activity)?;
    tracing::info!(
        "Exported trim {} as TCX ({} samples)",
        trim_id,
        cached.outcome.series.len()
    );

    Ok((
        [(header::CONTENT_TYPE, "application/vnd.garmin.tcx+xml")],
        document,
    ))
}

fn log_outcome(activity_name: &str, outcome: &TrimOutcome) {
    log_trace(&outcome.trace);

    if let Some(rejection) = &outcome.fallback {
        tracing::warn!(
            "Trim of '{}' rejected, keeping full activity: {}",
            activity_name,
            rejection
        );
    }
    for warning in &outcome.warnings {
        tracing::warn!("Trim of '{}' accepted with warning: {:?}", activity_name, warning);
    }

    tracing::info!(
        "Trimmed '{}' ({:?}, applied: {}) to index {} of {} samples: {:.0} m, {} s",
        activity_name,
        outcome.plan.source,
        outcome.trim_applied,
        outcome.plan.end_index,
        outcome.series.len(),
        outcome.metrics.distance,
        outcome.metrics.elapsed_time
    );
}

fn log_trace(trace: &DetectionTrace) {
    if let Some(issue) = &trace.manual_bounds_issue {
        tracing::warn!("Ignoring manual trim bounds: {}", issue);
    }
    for rejected in &trace.rejected {
        tracing::debug!(
            "Discarded stop at index {} ({:?}): {:?}",
            rejected.candidate.index,
            rejected.candidate.method,
            rejected.rejection
        );
    }
    tracing::debug!(
        "{:?} detection kept {} candidate(s), interval pattern: {}",
        trace.strategy,
        trace.candidates.len(),
        trace.interval_pattern
    );
}
