use crate::pipeline::detect::thresholds::Thresholds;
use crate::types::series::Series;
use crate::types::trim::{CandidateRejection, DetectionMethod, RejectedCandidate, StopCandidate};

struct Run {
    first: usize,
    last: usize,
}

fn runs(len: usize, mut matches: impl FnMut(usize) -> bool) -> Vec<Run> {
    let mut found = Vec::new();
    let mut current: Option<usize> = None;
    for idx in 0..len {
        match (matches(idx), current) {
            (true, None) => current = Some(idx),
            (false, Some(first)) => {
                found.push(Run { first, last: idx - 1 });
                current = None;
            }
            _ => {}
        }
    }
    if let Some(first) = current {
        found.push(Run { first, last: len - 1 });
    }
    found
}

fn candidate_at(
    series: &Series,
    index: usize,
    last_stopped: usize,
    method: DetectionMethod,
) -> StopCandidate {
    let end = if last_stopped + 1 < series.len() {
        last_stopped + 1
    } else {
        last_stopped
    };
    let total = series.total_distance();
    let distance_at_stop = series.distance()[index];
    StopCandidate {
        index,
        duration_seconds: (series.time_at(end) - series.time_at(index)).max(0.0),
        distance_at_stop,
        distance_percent: if total > 0.0 {
            distance_at_stop / total * 100.0
        } else {
            0.0
        },
        method,
        score: None,
    }
}

pub fn velocity_candidates(series: &Series, thresholds: &Thresholds) -> Vec<StopCandidate> {
    let Some(velocity) = series.velocity() else {
        return Vec::new();
    };

    runs(series.len(), |idx| {
        let v = velocity[idx];
        v.is_finite() && v < thresholds.velocity_threshold
    })
    .into_iter()
    .filter(|run| run.last - run.first + 1 >= thresholds.flat_window)
    .map(|run| candidate_at(series, run.first, run.last, DetectionMethod::Velocity))
    .filter(|candidate| candidate.duration_seconds >= thresholds.min_duration)
    .collect()
}

// Reported index is the sample before the first flat delta.
pub fn distance_delta_candidates(series: &Series, thresholds: &Thresholds) -> Vec<StopCandidate> {
    let distance = series.distance();
    if distance.len() < 2 {
        return Vec::new();
    }

    runs(distance.len(), |idx| {
        idx > 0 && (distance[idx] - distance[idx - 1]).abs() <= thresholds.flat_tolerance
    })
    .into_iter()
    .filter(|run| run.last - run.first + 1 >= thresholds.flat_window)
    .map(|run| candidate_at(series, run.first - 1, run.last, DetectionMethod::DistanceDelta))
    .filter(|candidate| candidate.duration_seconds >= thresholds.min_duration)
    .collect()
}

pub fn filter_candidates(
    candidates: Vec<StopCandidate>,
    thresholds: &Thresholds,
) -> (Vec<StopCandidate>, Vec<RejectedCandidate>) {
    let mut kept = Vec::new();
    let mut rejected = Vec::new();
    for candidate in candidates {
        let rejection = if candidate.distance_percent < thresholds.early_stop_percentage {
            Some(CandidateRejection::TooEarly {
                distance_percent: candidate.distance_percent,
                floor_percent: thresholds.early_stop_percentage,
            })
        } else if candidate.distance_at_stop < thresholds.minimum_significant_distance {
            Some(CandidateRejection::InsignificantDistance {
                distance: candidate.distance_at_stop,
                floor: thresholds.minimum_significant_distance,
            })
        } else {
            None
        };

        match rejection {
            Some(rejection) => rejected.push(RejectedCandidate { candidate, rejection }),
            None => kept.push(candidate),
        }
    }
    (kept, rejected)
}
