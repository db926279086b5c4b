use crate::types::activity::ActivityType;

/// Stop-detection tuning for one activity type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Below this speed (m/s) a sample counts as stopped.
    pub velocity_threshold: f64,
    /// Largest distance change (m) between samples that still counts as flat.
    pub flat_tolerance: f64,
    /// Minimum number of consecutive stopped samples.
    pub flat_window: usize,
    /// Minimum stop length in seconds.
    pub min_duration: f64,
    /// Stops before this share of total distance (0-100) are ignored.
    pub early_stop_percentage: f64,
    /// Stops before this distance (m) are ignored as start-line noise.
    pub minimum_significant_distance: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            velocity_threshold: 0.3,
            flat_tolerance: 0.5,
            flat_window: 10,
            min_duration: 20.0,
            early_stop_percentage: 20.0,
            minimum_significant_distance: 100.0,
        }
    }
}

impl Thresholds {
    pub fn for_activity(activity: ActivityType) -> Self {
        let base = Self::default();
        match activity {
            ActivityType::Run | ActivityType::TrailRun | ActivityType::VirtualRun => Self {
                velocity_threshold: 0.2,
                min_duration: 30.0,
                ..base
            },
            ActivityType::Ride => Self {
                flat_tolerance: 1.0,
                ..base
            },
            ActivityType::Swim => Self {
                flat_window: 5,
                ..base
            },
            ActivityType::Walk | ActivityType::Hike => Self {
                early_stop_percentage: 10.0,
                ..base
            },
            ActivityType::Other => base,
        }
    }
}

/// Share of the final distance treated as cool-down when interval training
/// is detected.
pub const COOLDOWN_DISTANCE_PERCENT: f64 = 25.0;
