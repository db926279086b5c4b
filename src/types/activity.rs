use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Run,
    TrailRun,
    VirtualRun,
    Walk,
    Hike,
    Ride,
    Swim,
    Other,
}

impl ActivityType {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Run" => ActivityType::Run,
            "TrailRun" => ActivityType::TrailRun,
            "VirtualRun" => ActivityType::VirtualRun,
            "Walk" => ActivityType::Walk,
            "Hike" => ActivityType::Hike,
            "Ride" | "VirtualRide" | "MountainBikeRide" | "GravelRide" | "EBikeRide"
            | "EMountainBikeRide" => ActivityType::Ride,
            "Swim" => ActivityType::Swim,
            _ => ActivityType::Other,
        }
    }

    pub fn is_running_like(self) -> bool {
        matches!(
            self,
            ActivityType::Run | ActivityType::TrailRun | ActivityType::VirtualRun
        )
    }
}

/// Activity record as returned by the fitness service's activity endpoint.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    pub sport_type: Option<String>,
    pub start_date: Option<String>,
    pub start_date_local: Option<String>,
    pub description: Option<String>,
    pub distance: Option<f64>,
    pub elapsed_time: Option<f64>,
    pub total_elevation_gain: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub average_cadence: Option<f64>,
    pub average_speed: Option<f64>,
    pub gear_id: Option<String>,
    pub private: Option<bool>,
    pub workout_type: Option<i64>,
    pub hide_from_home: Option<bool>,
    pub trainer: Option<bool>,
    pub commute: Option<bool>,
    pub photos: Option<Value>,
}

impl ActivityMetadata {
    /// `sport_type` is the finer-grained field; `type` is the legacy one.
    pub fn kind(&self) -> ActivityType {
        match self.sport_type.as_deref() {
            Some(sport) if ActivityType::from_name(sport) != ActivityType::Other => {
                ActivityType::from_name(sport)
            }
            _ => ActivityType::from_name(&self.activity_type),
        }
    }
}

/// Corrected activity record handed to the "create activity" collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityMetrics {
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_local: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub distance: f64,
    pub elapsed_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heartrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_speed: Option<f64>,
    pub total_elevation_gain: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_from_home: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Value>,
}
