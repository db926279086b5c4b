use serde::Deserialize;

use crate::error::StreamError;
use crate::pipeline::detect::detect_stop_traced;
use crate::pipeline::manual::{resolve_manual_trim, ManualBounds};
use crate::pipeline::normalize::normalize;
use crate::pipeline::synthesize::synthesize;
use crate::pipeline::validate::assess_trim;
use crate::types::activity::ActivityMetadata;
use crate::types::streams::RawStreams;
use crate::types::trim::{DetectionTrace, Strategy, TrimOutcome, TrimPlan, TrimSource};

#[derive(Debug, Clone, Deserialize)]
pub struct TrimRequest {
    pub streams: RawStreams,
    pub activity: ActivityMetadata,
    #[serde(default)]
    pub corrected_distance_meters: Option<f64>,
    #[serde(default)]
    pub manual_start_time_seconds: Option<f64>,
    #[serde(default)]
    pub manual_end_time_seconds: Option<f64>,
}

impl TrimRequest {
    fn wants_manual_trim(&self) -> bool {
        self.manual_start_time_seconds.is_some() || self.manual_end_time_seconds.is_some()
    }
}

/// Only malformed streams fail. A rejected trim falls back to the full
/// recording and is reported through `fallback`.
pub fn trim_activity(request: &TrimRequest) -> Result<TrimOutcome, StreamError> {
    let full = normalize(&request.streams)?;
    let activity = request.activity.kind();

    let manual = if request.wants_manual_trim() {
        Some(ManualBounds::new(
            request.manual_start_time_seconds,
            request.manual_end_time_seconds,
        ))
    } else {
        None
    };

    let (plan, trace) = match manual {
        Some(Ok(bounds)) => {
            let strategy = if activity.is_running_like() {
                Strategy::Running
            } else {
                Strategy::Generic
            };
            (resolve_manual_trim(&full, bounds), DetectionTrace::new(strategy))
        }
        other => {
            let detection = detect_stop_traced(&full, activity);
            let mut trace = detection.trace;
            if let Some(Err(issue)) = other {
                trace.note_manual_bounds(&issue);
            }
            let plan = match detection.selected {
                Some(stop) => TrimPlan {
                    start_index: None,
                    end_index: stop.index,
                    source: TrimSource::Auto,
                },
                None => TrimPlan::full(&full),
            };
            (plan, trace)
        }
    };

    let mut fallback = None;
    let mut warnings = Vec::new();
    let (plan, series) = if plan.source == TrimSource::None {
        (plan, full.clone())
    } else {
        let trimmed = plan.apply(&full);
        match assess_trim(&full, &trimmed, activity) {
            Ok(found) => {
                warnings = found;
                (plan, trimmed)
            }
            Err(rejection) => {
                fallback = Some(rejection);
                (TrimPlan::full(&full), full.clone())
            }
        }
    };

    let start_offset_seconds = plan.start_index.map_or(0.0, |idx| full.time_at(idx));
    let metrics = synthesize(&series, &request.activity, request.corrected_distance_meters);
    let stream_distance = series.total_distance();
    let distance_scale = if stream_distance > 0.0 {
        metrics.distance / stream_distance
    } else {
        1.0
    };

    Ok(TrimOutcome {
        metrics,
        plan,
        trim_applied: plan.source != TrimSource::None,
        fallback,
        warnings,
        trace,
        series,
        start_offset_seconds,
        distance_scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> TrimRequest {
        serde_json::from_value(body).expect("request")
    }

    /// 20 minutes running at 3 m/s, then 10 minutes standing still.
    fn late_stop_streams() -> serde_json::Value {
        let time: Vec<u32> = (0..=1800).collect();
        let distance: Vec<f64> = time.iter().map(|&t| f64::from(t.min(1200)) * 3.0).collect();
        let velocity: Vec<f64> = time.iter().map(|&t| if t < 1200 { 3.0 } else { 0.0 }).collect();
        json!({
            "time": {"data": time},
            "distance": {"data": distance},
            "velocity_smooth": {"data": velocity}
        })
    }

    #[test]
    fn automatic_trim_cuts_standing_time() {
        let outcome = trim_activity(&request(json!({
            "streams": late_stop_streams(),
            "activity": {"name": "Run", "type": "Run", "distance": 3600.0, "elapsed_time": 1800}
        })))
        .expect("outcome");

        assert!(outcome.trim_applied);
        assert_eq!(outcome.plan.source, TrimSource::Auto);
        assert_eq!(outcome.plan.end_index, 1200);
        assert_eq!(outcome.metrics.elapsed_time, 1200);
        assert_eq!(outcome.metrics.distance, 3600.0);
        assert!(outcome.fallback.is_none());
    }

    #[test]
    fn malformed_manual_bounds_fall_back_to_detection() {
        let outcome = trim_activity(&request(json!({
            "streams": late_stop_streams(),
            "activity": {"name": "Run", "type": "Run"},
            "manual_start_time_seconds": 600.0
        })))
        .expect("outcome");

        assert_eq!(outcome.plan.source, TrimSource::Auto);
        assert!(outcome.trace.manual_bounds_issue.is_some());
    }

    #[test]
    fn manual_bounds_take_precedence() {
        let outcome = trim_activity(&request(json!({
            "streams": late_stop_streams(),
            "activity": {"name": "Run", "type": "Ride"},
            "manual_start_time_seconds": 100.0,
            "manual_end_time_seconds": 1000.0
        })))
        .expect("outcome");

        assert_eq!(outcome.plan.source, TrimSource::Manual);
        assert_eq!(outcome.plan.start_index, Some(100));
        assert_eq!(outcome.plan.end_index, 1000);
        assert_eq!(outcome.start_offset_seconds, 100.0);
        assert_eq!(outcome.metrics.elapsed_time, 900);
        assert_eq!(outcome.metrics.distance, 2700.0);
    }

    #[test]
    fn rejected_trim_reports_fallback() {
        let outcome = trim_activity(&request(json!({
            "streams": late_stop_streams(),
            "activity": {"name": "Run", "type": "Run"},
            "manual_start_time_seconds": 0.0,
            "manual_end_time_seconds": 300.0
        })))
        .expect("outcome");

        assert!(!outcome.trim_applied);
        assert_eq!(outcome.plan.source, TrimSource::None);
        assert!(outcome.fallback.is_some());
        assert_eq!(outcome.metrics.distance, 3600.0);
    }

    #[test]
    fn corrected_distance_sets_scale() {
        let outcome = trim_activity(&request(json!({
            "streams": late_stop_streams(),
            "activity": {"name": "Run", "type": "Run"},
            "corrected_distance_meters": 4000.0
        })))
        .expect("outcome");
        assert_eq!(outcome.metrics.distance, 4000.0);
        assert!((outcome.distance_scale - 4000.0 / 3600.0).abs() < 1e-9);
    }

    #[test]
    fn broken_streams_fail() {
        let err = trim_activity(&request(json!({
            "streams": {"heartrate": {"data": [120, 130]}},
            "activity": {"name": "Run", "type": "Run"}
        })))
        .unwrap_err();
        assert!(matches!(err, StreamError::InvalidStreamFormat(_)));
    }
}
