pub mod candidates;
pub mod running;
pub mod thresholds;

use crate::types::activity::ActivityType;
use crate::types::series::Series;
use crate::types::trim::{DetectionTrace, StopCandidate, StopDetection, Strategy};

pub use thresholds::Thresholds;

/// Best stop index for `series`, or `None` when the recording never stops.
pub fn detect_stop(series: &Series, activity: ActivityType) -> Option<StopCandidate> {
    detect_stop_traced(series, activity).selected
}

pub fn detect_stop_traced(series: &Series, activity: ActivityType) -> StopDetection {
    detect_stop_with(series, activity, &Thresholds::for_activity(activity))
}

pub fn detect_stop_with(
    series: &Series,
    activity: ActivityType,
    thresholds: &Thresholds,
) -> StopDetection {
    let strategy = if activity.is_running_like() {
        Strategy::Running
    } else {
        Strategy::Generic
    };
    let mut trace = DetectionTrace::new(strategy);

    let mut raw = candidates::velocity_candidates(series, thresholds);
    raw.extend(candidates::distance_delta_candidates(series, thresholds));
    let (kept, rejected) = candidates::filter_candidates(raw, thresholds);
    trace.rejected = rejected;

    let selected = match strategy {
        Strategy::Generic => {
            let selected = select_generic(&kept);
            trace.candidates = kept;
            selected
        }
        Strategy::Running => {
            let selection = running::select(kept, thresholds);
            trace.interval_pattern = selection.interval_pattern;
            trace.candidates = selection.candidates;
            selection.selected
        }
    };

    StopDetection { selected, trace }
}

const NEARBY_DISTANCE_RATIO: f64 = 0.10;
const LONGER_STOP_RATIO: f64 = 1.5;

/// Earliest stop by distance, unless a clearly longer one sits close by.
fn select_generic(candidates: &[StopCandidate]) -> Option<StopCandidate> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        a.distance_at_stop
            .total_cmp(&b.distance_at_stop)
            .then(a.index.cmp(&b.index))
    });
    let first = sorted.first()?;

    let longer_nearby = sorted[1..]
        .iter()
        .filter(|c| {
            (c.distance_at_stop - first.distance_at_stop).abs()
                <= NEARBY_DISTANCE_RATIO * first.distance_at_stop
        })
        .filter(|c| c.duration_seconds >= LONGER_STOP_RATIO * first.duration_seconds)
        .max_by(|a, b| a.duration_seconds.total_cmp(&b.duration_seconds));

    Some(longer_nearby.unwrap_or(first).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::trim::DetectionMethod;

    fn candidate(index: usize, distance: f64, duration: f64) -> StopCandidate {
        StopCandidate {
            index,
            duration_seconds: duration,
            distance_at_stop: distance,
            distance_percent: distance / 10.0,
            method: DetectionMethod::Velocity,
            score: None,
        }
    }

    #[test]
    fn generic_picks_earliest_stop() {
        let selected = select_generic(&[candidate(90, 900.0, 40.0), candidate(50, 500.0, 30.0)]);
        assert_eq!(selected.map(|c| c.index), Some(50));
    }

    #[test]
    fn generic_prefers_clearly_longer_stop_nearby() {
        let selected = select_generic(&[
            candidate(50, 500.0, 30.0),
            candidate(53, 530.0, 50.0),
            candidate(90, 900.0, 300.0),
        ]);
        assert_eq!(selected.map(|c| c.index), Some(53));
    }

    #[test]
    fn generic_keeps_earliest_when_nearby_stop_is_not_much_longer() {
        let selected = select_generic(&[candidate(50, 500.0, 30.0), candidate(53, 530.0, 40.0)]);
        assert_eq!(selected.map(|c| c.index), Some(50));
    }

    #[test]
    fn steady_motion_has_no_stop() {
        let series = Series::from_distance((0..200).map(|i| i as f64 * 3.0).collect())
            .with_time((0..200).map(|i| i as f64).collect())
            .with_velocity(vec![3.0; 200]);
        for activity in [ActivityType::Run, ActivityType::Ride, ActivityType::Other] {
            let detection = detect_stop_traced(&series, activity);
            assert!(detection.selected.is_none());
            assert!(detection.trace.candidates.is_empty());
        }
    }

    #[test]
    fn early_stops_land_in_trace() {
        // Standing for 30 s right after the start, then moving.
        let mut distance = vec![0.0; 31];
        distance.extend((1..=170).map(|i| i as f64 * 4.0));
        let series = Series::from_distance(distance).with_time((0..201).map(|i| i as f64).collect());

        let detection = detect_stop_traced(&series, ActivityType::Other);
        assert!(detection.selected.is_none());
        assert_eq!(detection.trace.rejected.len(), 1);
        assert_eq!(detection.trace.strategy, Strategy::Generic);
    }
}
