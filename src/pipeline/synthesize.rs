use crate::types::activity::{ActivityMetadata, ActivityMetrics};
use crate::types::series::{finite_mean, Series};

pub fn synthesize(
    trimmed: &Series,
    original: &ActivityMetadata,
    corrected_distance: Option<f64>,
) -> ActivityMetrics {
    let stream_distance = trimmed.total_distance();
    let distance = match corrected_distance {
        Some(corrected) if corrected.is_finite() && corrected > 0.0 => corrected,
        _ => stream_distance,
    };
    let distance_ratio = original
        .distance
        .filter(|d| *d > 0.0 && stream_distance > 0.0)
        .map(|original_distance| stream_distance / original_distance);

    ActivityMetrics {
        name: original.name.clone(),
        activity_type: original.activity_type.clone(),
        sport_type: original.sport_type.clone(),
        start_date_local: original.start_date_local.clone(),
        description: original.description.clone(),
        distance,
        elapsed_time: elapsed_seconds(trimmed, original, distance_ratio).round().max(0.0) as u64,
        average_heartrate: trimmed
            .heartrate()
            .and_then(finite_mean)
            .or(original.average_heartrate),
        average_cadence: trimmed
            .cadence()
            .and_then(finite_mean)
            .or(original.average_cadence),
        average_speed: trimmed
            .velocity()
            .and_then(finite_mean)
            .or(original.average_speed),
        total_elevation_gain: elevation_gain(trimmed, original, distance_ratio),
        gear_id: original.gear_id.clone(),
        private: original.private,
        workout_type: original.workout_type,
        hide_from_home: original.hide_from_home,
        trainer: original.trainer,
        commute: original.commute,
        photos: original.photos.clone(),
    }
}

fn elapsed_seconds(trimmed: &Series, original: &ActivityMetadata, distance_ratio: Option<f64>) -> f64 {
    let stream_seconds = trimmed.time().map(|time| {
        time.iter()
            .copied()
            .filter(|t| t.is_finite())
            .fold(0.0, f64::max)
    });

    if let Some(seconds) = stream_seconds {
        let plausible = original.elapsed_time.map_or(true, |limit| seconds <= limit);
        if seconds > 0.0 && plausible {
            return seconds;
        }
    }

    match (original.elapsed_time, distance_ratio) {
        (Some(elapsed), Some(ratio)) => elapsed * ratio,
        (Some(elapsed), None) => elapsed,
        (None, _) => trimmed.duration(),
    }
}

fn elevation_gain(trimmed: &Series, original: &ActivityMetadata, distance_ratio: Option<f64>) -> f64 {
    let altitude_range = trimmed.altitude().and_then(|altitude| {
        let (min, max) = altitude
            .iter()
            .copied()
            .filter(|a| a.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), a| {
                (min.min(a), max.max(a))
            });
        (min <= max).then(|| (max - min).max(0.0))
    });

    match (altitude_range, original.total_elevation_gain) {
        (Some(range), _) => range,
        (None, Some(gain)) => gain * distance_ratio.unwrap_or(1.0),
        (None, None) => 0.0,
    }
}
