use serde_json::json;
use strim_rs::error::StreamError;
use strim_rs::pipeline::normalize::normalize_value;
use strim_rs::types::activity::{ActivityMetadata, ActivityType};
use strim_rs::types::series::Series;
use strim_rs::types::trim::{DetectionMethod, TrimSource};
use strim_rs::{
    detect_stop, resolve_manual_trim, synthesize, trim_activity, validate_trim, ManualBounds,
    Thresholds, TrimRequest,
};

/// 100 samples: linear 0 -> 1000 m over the first 86 samples (570 s), then
/// 15 samples standing at 1000 m for 30 s.
fn scenario_a_series() -> Series {
    let mut time = Vec::new();
    let mut distance = Vec::new();
    let mut velocity = Vec::new();
    for i in 0..100 {
        if i <= 85 {
            time.push(i as f64 * 570.0 / 85.0);
            distance.push(i as f64 * 1000.0 / 85.0);
        } else {
            time.push(570.0 + (i - 85) as f64 * 30.0 / 14.0);
            distance.push(1000.0);
        }
        velocity.push(if i < 85 { 1000.0 / 570.0 } else { 0.02 });
    }
    Series::from_distance(distance)
        .with_time(time)
        .with_velocity(velocity)
}

/// Constant pace at 1 Hz.
fn uniform(seconds: usize, speed: f64) -> Series {
    Series::from_distance((0..=seconds).map(|t| t as f64 * speed).collect())
        .with_time((0..=seconds).map(|t| t as f64).collect())
        .with_velocity(vec![speed; seconds + 1])
}

fn metadata(kind: &str, distance: f64, elapsed: f64) -> ActivityMetadata {
    ActivityMetadata {
        name: "Evening Session".to_string(),
        activity_type: kind.to_string(),
        start_date_local: Some("2026-05-10T18:00:00Z".to_string()),
        distance: Some(distance),
        elapsed_time: Some(elapsed),
        total_elevation_gain: Some(60.0),
        ..Default::default()
    }
}

#[test]
fn scenario_a_flat_tail_is_detected_at_run_start() {
    let series = scenario_a_series();
    let stop = detect_stop(&series, ActivityType::Other).expect("stop");
    assert_eq!(stop.index, 85);
    assert_eq!(stop.method, DetectionMethod::Velocity);
    assert!((stop.distance_at_stop - 1000.0).abs() < 1e-9);

    let trimmed = series.slice(0, stop.index);
    assert!((trimmed.total_distance() - 1000.0).abs() < 1e-9);
    assert!(validate_trim(&series, &trimmed, ActivityType::Other));
}

#[test]
fn scenario_b_manual_window_halves_uniform_activity() {
    let series = uniform(600, 3.0);
    let bounds = ManualBounds::new(Some(0.0), Some(300.0)).expect("bounds");
    let plan = resolve_manual_trim(&series, bounds);
    assert_eq!(plan.source, TrimSource::Manual);
    assert_eq!(plan.end_index, 300);

    let metrics = synthesize(&plan.apply(&series), &metadata("Ride", 1800.0, 600.0), None);
    assert_eq!(metrics.elapsed_time, 300);
    assert!((metrics.distance - 900.0).abs() < 1e-9);
}

#[test]
fn scenario_c_corrected_distance_and_elevation() {
    let base = uniform(1000, 4.0);
    let original = metadata("Run", 8000.0, 2000.0);

    let with_altitude = base
        .clone()
        .with_altitude((0..=1000).map(|i| 50.0 + (i as f64 / 100.0)).collect());
    let metrics = synthesize(&with_altitude, &original, Some(5000.0));
    assert_eq!(metrics.distance, 5000.0);
    assert!((metrics.total_elevation_gain - 10.0).abs() < 1e-9);

    let metrics = synthesize(&base, &original, Some(5000.0));
    assert_eq!(metrics.distance, 5000.0);
    // 4000 of the original 8000 m were recorded in this series.
    assert!((metrics.total_elevation_gain - 30.0).abs() < 1e-9);
}

#[test]
fn scenario_d_destructive_running_trim_falls_back_to_full_series() {
    let full = uniform(1000, 3.0);
    let trimmed = full.slice(0, 400);
    assert!(!validate_trim(&full, &trimmed, ActivityType::Run));

    let streams = json!({
        "time": {"data": (0..=1000).collect::<Vec<u32>>()},
        "distance": {"data": (0..=1000).map(|t| t as f64 * 3.0).collect::<Vec<f64>>()},
        "velocity_smooth": {"data": vec![3.0; 1001]}
    });
    let original = metadata("Run", 3000.0, 1000.0);
    let request: TrimRequest = serde_json::from_value(json!({
        "streams": streams,
        "activity": original,
        "manual_start_time_seconds": 0.0,
        "manual_end_time_seconds": 400.0
    }))
    .expect("request");

    let outcome = trim_activity(&request).expect("outcome");
    assert!(!outcome.trim_applied);
    assert!(outcome.fallback.is_some());
    assert_eq!(outcome.metrics, synthesize(&full, &original, None));
}

#[test]
fn scenario_e_missing_distance_is_invalid() {
    let err = normalize_value(json!({
        "time": {"data": [0, 1, 2]},
        "heartrate": {"data": [120, 121, 122]}
    }))
    .unwrap_err();
    assert!(matches!(err, StreamError::InvalidStreamFormat(_)));
}

#[test]
fn continuous_motion_never_stops() {
    let series = uniform(900, 2.5);
    for activity in [
        ActivityType::Run,
        ActivityType::Walk,
        ActivityType::Ride,
        ActivityType::Swim,
        ActivityType::Other,
    ] {
        assert!(detect_stop(&series, activity).is_none(), "{:?}", activity);
    }

    let distance_only = Series::from_distance((0..600).map(|t| t as f64 * 1.2).collect());
    assert!(detect_stop(&distance_only, ActivityType::Hike).is_none());
}

#[test]
fn synthetic_plateau_is_found_at_its_start() {
    let thresholds = Thresholds::default();
    for plateau_start in [300usize, 450, 580] {
        let len = 700;
        let distance: Vec<f64> = (0..len)
            .map(|t| t.min(plateau_start) as f64 * 2.0)
            .collect();
        let series = Series::from_distance(distance).with_time((0..len).map(|t| t as f64).collect());

        let stop = detect_stop(&series, ActivityType::Other).expect("stop");
        assert_eq!(stop.index, plateau_start);
        assert!(stop.duration_seconds >= thresholds.min_duration);
    }
}

#[test]
fn resynthesis_does_not_drift() {
    let trimmed = scenario_a_series().slice(0, 85).with_heartrate(vec![150.0; 86]);
    let original = metadata("Run", 1100.0, 700.0);
    let first = synthesize(&trimmed, &original, Some(1050.0));
    let second = synthesize(&trimmed, &original, Some(1050.0));
    assert_eq!(first, second);
}

#[test]
fn distance_floors_reject_destructive_trims() {
    let full = uniform(1000, 3.0);
    let keeps_quarter = full.slice(0, 250);
    let keeps_sixty = full.slice(0, 600);

    assert!(!validate_trim(&full, &keeps_quarter, ActivityType::Other));
    assert!(validate_trim(&full, &keeps_sixty, ActivityType::Other));
    assert!(!validate_trim(&full, &keeps_sixty, ActivityType::Run));
}
