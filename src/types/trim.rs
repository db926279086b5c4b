use serde::Serialize;

use crate::error::{MalformedManualBounds, TrimRejection};
use crate::types::activity::ActivityMetrics;
use crate::types::series::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Velocity,
    DistanceDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopCandidate {
    pub index: usize,
    pub duration_seconds: f64,
    pub distance_at_stop: f64,
    pub distance_percent: f64,
    pub method: DetectionMethod,
    /// Only set by the running-specific selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimSource {
    Manual,
    Auto,
    None,
}

/// Which samples to keep. `end_index` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimPlan {
    pub start_index: Option<usize>,
    pub end_index: usize,
    pub source: TrimSource,
}

impl TrimPlan {
    /// Plan that keeps the whole series.
    pub fn full(series: &Series) -> Self {
        Self {
            start_index: None,
            end_index: series.len().saturating_sub(1),
            source: TrimSource::None,
        }
    }

    pub fn apply(&self, series: &Series) -> Series {
        series.slice(self.start_index.unwrap_or(0), self.end_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CandidateRejection {
    TooEarly { distance_percent: f64, floor_percent: f64 },
    InsignificantDistance { distance: f64, floor: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    pub candidate: StopCandidate,
    pub rejection: CandidateRejection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Generic,
    Running,
}

/// Record of how a stop was (or was not) chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionTrace {
    pub strategy: Strategy,
    pub candidates: Vec<StopCandidate>,
    pub rejected: Vec<RejectedCandidate>,
    pub interval_pattern: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_bounds_issue: Option<String>,
}

impl DetectionTrace {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            candidates: Vec::new(),
            rejected: Vec::new(),
            interval_pattern: false,
            manual_bounds_issue: None,
        }
    }

    pub(crate) fn note_manual_bounds(&mut self, issue: &MalformedManualBounds) {
        self.manual_bounds_issue = Some(issue.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopDetection {
    pub selected: Option<StopCandidate>,
    pub trace: DetectionTrace,
}

/// Non-fatal observation from the trim validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrimWarning {
    ShortDuration { seconds: f64, comfortable_seconds: f64 },
}

#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub metrics: ActivityMetrics,
    pub plan: TrimPlan,
    pub trim_applied: bool,
    pub fallback: Option<TrimRejection>,
    pub warnings: Vec<TrimWarning>,
    pub trace: DetectionTrace,
    /// The series the metrics were computed from.
    pub series: Series,
    /// Original-clock time of the first retained sample.
    pub start_offset_seconds: f64,
    /// Factor applied to the stream distance when a corrected distance was supplied.
    pub distance_scale: f64,
}
