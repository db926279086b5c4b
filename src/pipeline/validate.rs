use crate::error::TrimRejection;
use crate::pipeline::detect::Thresholds;
use crate::types::activity::ActivityType;
use crate::types::series::{finite_mean, Series};
use crate::types::trim::TrimWarning;

const RUNNING_DISTANCE_FLOOR_PERCENT: f64 = 70.0;
const GENERIC_DISTANCE_FLOOR_PERCENT: f64 = 30.0;
const DURATION_FLOOR_SECONDS: f64 = 60.0;
/// Running trims shorter than this are kept but flagged.
const RUNNING_COMFORTABLE_SECONDS: f64 = 180.0;
const MAX_PACE_CHANGE_PERCENT: f64 = 50.0;

pub fn validate_trim(full: &Series, trimmed: &Series, activity: ActivityType) -> bool {
    assess_trim(full, trimmed, activity).is_ok()
}

pub fn assess_trim(
    full: &Series,
    trimmed: &Series,
    activity: ActivityType,
) -> Result<Vec<TrimWarning>, TrimRejection> {
    if trimmed.is_empty() {
        return Err(TrimRejection::Empty);
    }

    let full_distance = full.total_distance();
    if full_distance > 0.0 {
        let floor_percent = if activity.is_running_like() {
            RUNNING_DISTANCE_FLOOR_PERCENT
        } else {
            GENERIC_DISTANCE_FLOOR_PERCENT
        };
        let retained_percent = trimmed.total_distance() / full_distance * 100.0;
        if retained_percent < floor_percent {
            return Err(TrimRejection::DistanceRetained {
                retained_percent,
                floor_percent,
            });
        }
    }

    let seconds = trimmed.duration();
    if seconds < DURATION_FLOOR_SECONDS {
        return Err(TrimRejection::DurationTooShort {
            seconds,
            floor_seconds: DURATION_FLOOR_SECONDS,
        });
    }

    let threshold = Thresholds::for_activity(activity).velocity_threshold;
    if let (Some(before), Some(after)) = (
        moving_speed(full, threshold),
        moving_speed(trimmed, threshold),
    ) {
        let change_percent = (after - before).abs() / before * 100.0;
        if change_percent > MAX_PACE_CHANGE_PERCENT {
            return Err(TrimRejection::PaceInconsistent {
                before,
                after,
                change_percent,
            });
        }
    }

    let mut warnings = Vec::new();
    if activity.is_running_like() && seconds < RUNNING_COMFORTABLE_SECONDS {
        warnings.push(TrimWarning::ShortDuration {
            seconds,
            comfortable_seconds: RUNNING_COMFORTABLE_SECONDS,
        });
    }
    Ok(warnings)
}

fn moving_speed(series: &Series, threshold: f64) -> Option<f64> {
    let speeds: Vec<f64> = match series.velocity() {
        Some(velocity) => velocity.to_vec(),
        None => (1..series.len())
            .filter_map(|idx| {
                let dt = series.time_at(idx) - series.time_at(idx - 1);
                (dt > 0.0).then(|| (series.distance()[idx] - series.distance()[idx - 1]) / dt)
            })
            .collect(),
    };
    let moving: Vec<f64> = speeds.into_iter().filter(|v| *v >= threshold).collect();
    finite_mean(&moving).filter(|mean| *mean > 0.0)
}
