use crate::error::MalformedManualBounds;
use crate::types::series::Series;
use crate::types::trim::{TrimPlan, TrimSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualBounds {
    start: f64,
    end: f64,
}

impl ManualBounds {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Result<Self, MalformedManualBounds> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(MalformedManualBounds::Missing);
        };
        if !start.is_finite() || !end.is_finite() {
            return Err(MalformedManualBounds::NotFinite);
        }
        if start < 0.0 || end < 0.0 {
            return Err(MalformedManualBounds::Negative);
        }
        if end <= start {
            return Err(MalformedManualBounds::EndNotAfterStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }
}

// The end is matched on the clock re-originated at the start sample.
pub fn resolve_manual_trim(series: &Series, bounds: ManualBounds) -> TrimPlan {
    if series.is_empty() {
        return TrimPlan {
            start_index: None,
            end_index: 0,
            source: TrimSource::Manual,
        };
    }

    let start_index = if bounds.start > 0.0 {
        nearest_index(series, 0, bounds.start, 0.0)
    } else {
        0
    };
    let origin = series.time_at(start_index);
    let end_index = nearest_index(series, start_index, bounds.end - origin, origin);

    TrimPlan {
        start_index: (start_index > 0).then_some(start_index),
        end_index,
        source: TrimSource::Manual,
    }
}

// Ties go to the earlier sample.
fn nearest_index(series: &Series, from: usize, target: f64, origin: f64) -> usize {
    let mut best = from;
    let mut best_gap = f64::INFINITY;
    for idx in from..series.len() {
        let gap = (series.time_at(idx) - origin - target).abs();
        if gap < best_gap {
            best = idx;
            best_gap = gap;
        }
    }
    best
}
