use crate::pipeline::detect::thresholds::{Thresholds, COOLDOWN_DISTANCE_PERCENT};
use crate::types::trim::{DetectionMethod, StopCandidate};

const DURATION_WEIGHT: f64 = 0.5;
const POSITION_WEIGHT: f64 = 0.3;
const METHOD_WEIGHT: f64 = 0.2;
/// Stops this long or longer get the full duration score.
const SATURATING_STOP_SECONDS: f64 = 120.0;
const MIN_INTERVAL_STOPS: usize = 3;
/// Allowed deviation of each stop spacing from the mean spacing.
const INTERVAL_SPACING_TOLERANCE: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct RunningSelection {
    pub selected: Option<StopCandidate>,
    pub candidates: Vec<StopCandidate>,
    pub interval_pattern: bool,
}

pub fn select(candidates: Vec<StopCandidate>, thresholds: &Thresholds) -> RunningSelection {
    let scored: Vec<StopCandidate> = candidates
        .into_iter()
        .map(|mut candidate| {
            candidate.score = Some(score(&candidate));
            candidate
        })
        .collect();

    let stops = distinct_stops(&scored, thresholds.flat_window);
    let interval_pattern = is_interval_pattern(&stops);

    let cooldown_stop = if interval_pattern {
        let cooldown_start = 100.0 - COOLDOWN_DISTANCE_PERCENT;
        stops
            .iter()
            .filter(|c| c.distance_percent >= cooldown_start)
            .max_by_key(|c| c.index)
            .cloned()
    } else {
        None
    };

    // An interval session with no stop in the cool-down stretch is scored like any other.
    let selected = cooldown_stop.or_else(|| {
        scored
            .iter()
            .max_by(|a, b| {
                a.score
                    .unwrap_or(0.0)
                    .total_cmp(&b.score.unwrap_or(0.0))
                    .then(b.index.cmp(&a.index))
            })
            .cloned()
    });

    RunningSelection {
        selected,
        candidates: scored,
        interval_pattern,
    }
}

pub fn score(candidate: &StopCandidate) -> f64 {
    let duration_score = (candidate.duration_seconds / SATURATING_STOP_SECONDS).clamp(0.0, 1.0);
    let position_score = (candidate.distance_percent / 100.0).clamp(0.0, 1.0);
    let method_score = match candidate.method {
        DetectionMethod::Velocity => 1.0,
        DetectionMethod::DistanceDelta => 0.5,
    };
    DURATION_WEIGHT * duration_score + POSITION_WEIGHT * position_score + METHOD_WEIGHT * method_score
}

// Velocity wins when both signals report the same stop.
fn distinct_stops(candidates: &[StopCandidate], window: usize) -> Vec<StopCandidate> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by_key(|c| c.index);

    let mut stops: Vec<StopCandidate> = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        match stops.last_mut() {
            Some(last) if candidate.index - last.index <= window => {
                if last.method == DetectionMethod::DistanceDelta
                    && candidate.method == DetectionMethod::Velocity
                {
                    *last = candidate;
                }
            }
            _ => stops.push(candidate),
        }
    }
    stops
}

fn is_interval_pattern(stops: &[StopCandidate]) -> bool {
    if stops.len() < MIN_INTERVAL_STOPS {
        return false;
    }
    let spacings: Vec<f64> = stops
        .windows(2)
        .map(|pair| pair[1].distance_at_stop - pair[0].distance_at_stop)
        .collect();
    let mean = spacings.iter().sum::<f64>() / spacings.len() as f64;
    if mean <= 0.0 {
        return false;
    }
    spacings
        .iter()
        .all(|spacing| (spacing - mean).abs() <= INTERVAL_SPACING_TOLERANCE * mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(index: usize, percent: f64, duration: f64, method: DetectionMethod) -> StopCandidate {
        StopCandidate {
            index,
            duration_seconds: duration,
            distance_at_stop: percent * 100.0,
            distance_percent: percent,
            method,
            score: None,
        }
    }

    #[test]
    fn scores_follow_weights() {
        let full = stop(10, 100.0, 240.0, DetectionMethod::Velocity);
        assert!((score(&full) - 1.0).abs() < 1e-9);

        let weak = stop(10, 50.0, 60.0, DetectionMethod::DistanceDelta);
        assert!((score(&weak) - (0.25 + 0.15 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn interval_session_ends_at_cooldown_stop() {
        let candidates = vec![
            stop(300, 30.0, 90.0, DetectionMethod::Velocity),
            stop(500, 50.0, 120.0, DetectionMethod::Velocity),
            stop(700, 70.0, 90.0, DetectionMethod::Velocity),
            stop(950, 95.0, 35.0, DetectionMethod::Velocity),
        ];
        let selection = select(candidates, &Thresholds::default());
        assert!(selection.interval_pattern);
        assert_eq!(selection.selected.map(|c| c.index), Some(950));
        assert!(selection.candidates.iter().all(|c| c.score.is_some()));
    }

    #[test]
    fn intervals_without_cooldown_stop_use_scoring() {
        let candidates = vec![
            stop(200, 20.0, 30.0, DetectionMethod::Velocity),
            stop(400, 40.0, 120.0, DetectionMethod::Velocity),
            stop(600, 60.0, 40.0, DetectionMethod::Velocity),
        ];
        let selection = select(candidates, &Thresholds::default());
        assert!(selection.interval_pattern);
        assert_eq!(selection.selected.map(|c| c.index), Some(400));
    }

    #[test]
    fn duplicate_signals_count_once_for_intervals() {
        // Two physical stops, each reported by both signals: not an interval session.
        let candidates = vec![
            stop(500, 50.0, 120.0, DetectionMethod::Velocity),
            stop(501, 50.0, 110.0, DetectionMethod::DistanceDelta),
            stop(950, 95.0, 35.0, DetectionMethod::Velocity),
            stop(951, 95.0, 30.0, DetectionMethod::DistanceDelta),
        ];
        let selection = select(candidates, &Thresholds::default());
        assert!(!selection.interval_pattern);
        assert_eq!(selection.selected.map(|c| c.index), Some(500));
    }

    #[test]
    fn uneven_stops_fall_back_to_scoring() {
        let candidates = vec![
            stop(250, 25.0, 30.0, DetectionMethod::Velocity),
            stop(300, 30.0, 30.0, DetectionMethod::Velocity),
            stop(600, 60.0, 30.0, DetectionMethod::DistanceDelta),
            stop(980, 98.0, 120.0, DetectionMethod::Velocity),
        ];
        let selection = select(candidates, &Thresholds::default());
        assert!(!selection.interval_pattern);
        assert_eq!(selection.selected.map(|c| c.index), Some(980));
    }

    #[test]
    fn no_candidates_select_nothing() {
        let selection = select(Vec::new(), &Thresholds::default());
        assert!(selection.selected.is_none());
        assert!(!selection.interval_pattern);
    }
}
