use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Stream payload as delivered by the activity-stream endpoint.
///
/// Three encodings are accepted: keyed by channel name
/// (`key_by_type=true`), a list of typed channels, or either of those
/// serialized into a JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawStreams {
    Keyed(HashMap<String, StreamData>),
    Listed(Vec<TypedStream>),
    Encoded(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamData {
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypedStream {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<Value>,
}

/// Channels the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Time,
    Distance,
    Velocity,
    Heartrate,
    Cadence,
    Altitude,
    LatLng,
}

impl Channel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "time" => Some(Channel::Time),
            "distance" => Some(Channel::Distance),
            "velocity" | "velocity_smooth" => Some(Channel::Velocity),
            "heartrate" | "heart_rate" => Some(Channel::Heartrate),
            "cadence" => Some(Channel::Cadence),
            "altitude" => Some(Channel::Altitude),
            "latlng" => Some(Channel::LatLng),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Time => "time",
            Channel::Distance => "distance",
            Channel::Velocity => "velocity",
            Channel::Heartrate => "heartrate",
            Channel::Cadence => "cadence",
            Channel::Altitude => "altitude",
            Channel::LatLng => "latlng",
        }
    }
}
