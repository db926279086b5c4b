use std::collections::HashMap;

use serde_json::Value;

use crate::error::StreamError;
use crate::types::series::Series;
use crate::types::streams::{Channel, RawStreams};

/// Turns any accepted stream encoding into an aligned [`Series`].
pub fn normalize(raw: &RawStreams) -> Result<Series, StreamError> {
    let decoded;
    let raw = match raw {
        RawStreams::Encoded(text) => {
            decoded = decode(text)?;
            &decoded
        }
        other => other,
    };

    let channels: Vec<(&str, &[Value])> = match raw {
        RawStreams::Keyed(map) => map
            .iter()
            .map(|(name, stream)| (name.as_str(), stream.data.as_slice()))
            .collect(),
        RawStreams::Listed(list) => list
            .iter()
            .map(|stream| (stream.kind.as_str(), stream.data.as_slice()))
            .collect(),
        RawStreams::Encoded(_) => {
            return Err(StreamError::InvalidStreamFormat(
                "encoded streams must decode to a channel map or list".to_string(),
            ))
        }
    };

    build_series(&channels)
}

/// Parses a JSON document into a stream payload.
pub fn normalize_value(value: Value) -> Result<Series, StreamError> {
    let raw: RawStreams = serde_json::from_value(value)
        .map_err(|err| StreamError::InvalidStreamFormat(err.to_string()))?;
    normalize(&raw)
}

fn decode(text: &str) -> Result<RawStreams, StreamError> {
    serde_json::from_str(text).map_err(|err| {
        StreamError::InvalidStreamFormat(format!("could not decode stream text: {}", err))
    })
}

fn build_series(channels: &[(&str, &[Value])]) -> Result<Series, StreamError> {
    // Canonical names beat aliases; among equals the first listed wins.
    let mut ranked: HashMap<Channel, (bool, &[Value])> = HashMap::new();
    for (name, data) in channels {
        let Some(channel) = Channel::from_name(name) else {
            continue;
        };
        let is_alias = *name != channel.name();
        let replace = match ranked.get(&channel) {
            Some((held_alias, _)) => *held_alias && !is_alias,
            None => true,
        };
        if replace {
            ranked.insert(channel, (is_alias, *data));
        }
    }
    let known: HashMap<Channel, &[Value]> = ranked
        .into_iter()
        .map(|(channel, (_, data))| (channel, data))
        .collect();

    let distance_raw = known
        .get(&Channel::Distance)
        .filter(|data| !data.is_empty())
        .ok_or_else(|| {
            StreamError::InvalidStreamFormat("missing required channel: distance".to_string())
        })?;

    let len = known.values().map(|data| data.len()).min().unwrap_or(0);
    if len == 0 {
        return Err(StreamError::EmptySeries);
    }

    let mut series = Series::from_distance(required_numbers(Channel::Distance, distance_raw, len)?);
    if let Some(data) = known.get(&Channel::Time) {
        series.time = Some(required_numbers(Channel::Time, data, len)?);
    }
    if let Some(data) = known.get(&Channel::Velocity) {
        series.velocity = Some(optional_numbers(Channel::Velocity, data, len)?);
    }
    if let Some(data) = known.get(&Channel::Heartrate) {
        series.heartrate = Some(optional_numbers(Channel::Heartrate, data, len)?);
    }
    if let Some(data) = known.get(&Channel::Cadence) {
        series.cadence = Some(optional_numbers(Channel::Cadence, data, len)?);
    }
    if let Some(data) = known.get(&Channel::Altitude) {
        series.altitude = Some(optional_numbers(Channel::Altitude, data, len)?);
    }
    if let Some(data) = known.get(&Channel::LatLng) {
        let (lat, lng) = split_latlng(data, len)?;
        series.latitude = Some(lat);
        series.longitude = Some(lng);
    }

    Ok(series)
}

fn required_numbers(channel: Channel, data: &[Value], len: usize) -> Result<Vec<f64>, StreamError> {
    data[..len]
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            value.as_f64().ok_or_else(|| {
                StreamError::InvalidStreamFormat(format!(
                    "non-numeric {} value at index {}",
                    channel.name(),
                    idx
                ))
            })
        })
        .collect()
}

/// Nulls become `NaN` gaps; anything else non-numeric is rejected.
fn optional_numbers(channel: Channel, data: &[Value], len: usize) -> Result<Vec<f64>, StreamError> {
    data[..len]
        .iter()
        .enumerate()
        .map(|(idx, value)| match value {
            Value::Null => Ok(f64::NAN),
            other => other.as_f64().ok_or_else(|| {
                StreamError::InvalidStreamFormat(format!(
                    "non-numeric {} value at index {}",
                    channel.name(),
                    idx
                ))
            }),
        })
        .collect()
}

fn split_latlng(data: &[Value], len: usize) -> Result<(Vec<f64>, Vec<f64>), StreamError> {
    let mut lat = Vec::with_capacity(len);
    let mut lng = Vec::with_capacity(len);
    for (idx, pair) in data[..len].iter().enumerate() {
        match pair {
            Value::Null => {
                lat.push(f64::NAN);
                lng.push(f64::NAN);
            }
            Value::Array(coord) if coord.len() >= 2 => {
                lat.push(coord[0].as_f64().unwrap_or(f64::NAN));
                lng.push(coord[1].as_f64().unwrap_or(f64::NAN));
            }
            _ => {
                return Err(StreamError::InvalidStreamFormat(format!(
                    "latlng entry at index {} is not a [lat, lng] pair",
                    idx
                )))
            }
        }
    }
    Ok((lat, lng))
}
