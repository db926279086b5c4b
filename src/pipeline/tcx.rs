use std::io::Cursor;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::ExportError;
use crate::types::activity::{ActivityMetadata, ActivityMetrics, ActivityType};
use crate::types::series::{finite_mean, Series};
use crate::types::trim::TrimOutcome;

const TCX_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
const ACTIVITY_EXTENSION_NAMESPACE: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";

pub fn export_outcome(outcome: &TrimOutcome, original: &ActivityMetadata) -> Result<String, ExportError> {
    let start = offset(start_time(original)?, outcome.start_offset_seconds)?;
    let series = if (outcome.distance_scale - 1.0).abs() > f64::EPSILON {
        outcome.series.scale_distance(outcome.distance_scale)
    } else {
        outcome.series.clone()
    };
    write_tcx(&series, &outcome.metrics, original.kind(), start)
}

/// Activity start in UTC: `start_date`, else `start_date_local` read as UTC.
pub fn start_time(original: &ActivityMetadata) -> Result<DateTime<Utc>, ExportError> {
    if let Some(parsed) = original.start_date.as_deref().and_then(parse_timestamp) {
        return Ok(parsed);
    }
    original
        .start_date_local
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or(ExportError::MissingStartTime)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn offset(at: DateTime<Utc>, seconds: f64) -> Result<DateTime<Utc>, ExportError> {
    if !seconds.is_finite() {
        return Err(ExportError::TimeOutOfRange(seconds));
    }
    TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or(ExportError::TimeOutOfRange(seconds))
}

fn sport_name(activity: ActivityType) -> &'static str {
    match activity {
        ActivityType::Run | ActivityType::TrailRun | ActivityType::VirtualRun => "Running",
        ActivityType::Ride => "Biking",
        _ => "Other",
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn write_tcx(
    series: &Series,
    metrics: &ActivityMetrics,
    activity: ActivityType,
    start: DateTime<Utc>,
) -> Result<String, ExportError> {
    let mut tcx = TcxWriter::new();
    let start_stamp = timestamp(start);

    tcx.decl()?;
    tcx.open("TrainingCenterDatabase", &[("xmlns", TCX_NAMESPACE)])?;
    tcx.open("Activities", &[])?;
    tcx.open("Activity", &[("Sport", sport_name(activity))])?;
    tcx.text_element("Id", &start_stamp)?;

    tcx.open("Lap", &[("StartTime", start_stamp.as_str())])?;
    tcx.text_element("TotalTimeSeconds", &metrics.elapsed_time.to_string())?;
    tcx.text_element("DistanceMeters", &format!("{:.2}", metrics.distance))?;
    tcx.text_element("Calories", "0")?;
    if let Some(hr) = series.heartrate().and_then(finite_mean) {
        tcx.open("AverageHeartRateBpm", &[])?;
        tcx.text_element("Value", &format!("{}", hr.round() as u32))?;
        tcx.close("AverageHeartRateBpm")?;
    }
    tcx.text_element("Intensity", "Active")?;
    tcx.text_element("TriggerMethod", "Manual")?;

    tcx.open("Track", &[])?;
    for sample in series.samples() {
        tcx.open("Trackpoint", &[])?;
        let at = offset(start, sample.time)?;
        tcx.text_element("Time", &timestamp(at))?;
        if let (Some(lat), Some(lon)) = (sample.latitude, sample.longitude) {
            tcx.open("Position", &[])?;
            tcx.text_element("LatitudeDegrees", &format!("{:.7}", lat))?;
            tcx.text_element("LongitudeDegrees", &format!("{:.7}", lon))?;
            tcx.close("Position")?;
        }
        if let Some(altitude) = sample.altitude {
            tcx.text_element("AltitudeMeters", &format!("{:.1}", altitude))?;
        }
        tcx.text_element("DistanceMeters", &format!("{:.2}", sample.distance))?;
        if let Some(hr) = sample.heartrate {
            tcx.open("HeartRateBpm", &[])?;
            tcx.text_element("Value", &format!("{}", hr.round() as u32))?;
            tcx.close("HeartRateBpm")?;
        }
        if let Some(cadence) = sample.cadence {
            tcx.text_element("Cadence", &format!("{}", cadence.round() as u32))?;
        }
        tcx.close("Trackpoint")?;
    }
    tcx.close("Track")?;
    if let Some(speed) = metrics.average_speed {
        tcx.open("Extensions", &[])?;
        tcx.open("LX", &[("xmlns", ACTIVITY_EXTENSION_NAMESPACE)])?;
        tcx.text_element("AvgSpeed", &format!("{:.3}", speed))?;
        tcx.close("LX")?;
        tcx.close("Extensions")?;
    }
    tcx.close("Lap")?;

    if !metrics.name.is_empty() {
        tcx.text_element("Notes", &metrics.name)?;
    }
    tcx.close("Activity")?;
    tcx.close("Activities")?;
    tcx.close("TrainingCenterDatabase")?;

    tcx.finish()
}

struct TcxWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl TcxWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Xml(e.to_string()))
    }

    fn decl(&mut self) -> Result<(), ExportError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.write(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<(), ExportError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        self.open(name, &[])?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String, ExportError> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| ExportError::Xml(e.to_string()))
    }
}
