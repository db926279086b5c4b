/// One instant of a recording, read out of a [`Series`] by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: usize,
    pub time: f64,
    pub distance: f64,
    pub velocity: Option<f64>,
    pub heartrate: Option<f64>,
    pub cadence: Option<f64>,
    pub altitude: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Normalized, index-aligned table of stream channels.
///
/// Every present channel has exactly `len()` values. Optional channels may
/// contain `NaN` where the source stream had a gap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub(crate) time: Option<Vec<f64>>,
    pub(crate) distance: Vec<f64>,
    pub(crate) velocity: Option<Vec<f64>>,
    pub(crate) heartrate: Option<Vec<f64>>,
    pub(crate) cadence: Option<Vec<f64>>,
    pub(crate) altitude: Option<Vec<f64>>,
    pub(crate) latitude: Option<Vec<f64>>,
    pub(crate) longitude: Option<Vec<f64>>,
}

impl Series {
    /// Builds a series from a distance channel; other channels are attached
    /// with the `with_*` builders and must match its length.
    pub fn from_distance(distance: Vec<f64>) -> Self {
        Self {
            distance,
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time: Vec<f64>) -> Self {
        self.time = Some(time);
        self.align()
    }

    pub fn with_velocity(mut self, velocity: Vec<f64>) -> Self {
        self.velocity = Some(velocity);
        self.align()
    }

    pub fn with_heartrate(mut self, heartrate: Vec<f64>) -> Self {
        self.heartrate = Some(heartrate);
        self.align()
    }

    pub fn with_cadence(mut self, cadence: Vec<f64>) -> Self {
        self.cadence = Some(cadence);
        self.align()
    }

    pub fn with_altitude(mut self, altitude: Vec<f64>) -> Self {
        self.altitude = Some(altitude);
        self.align()
    }

    pub fn with_position(mut self, latitude: Vec<f64>, longitude: Vec<f64>) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self.align()
    }

    /// Truncates every channel to the shortest one.
    fn align(mut self) -> Self {
        let len = self.channels().map(|c| c.len()).min().unwrap_or(0);
        self.for_each_channel(|channel| channel.truncate(len));
        self
    }

    fn channels(&self) -> impl Iterator<Item = &Vec<f64>> {
        std::iter::once(&self.distance).chain(
            [
                &self.time,
                &self.velocity,
                &self.heartrate,
                &self.cadence,
                &self.altitude,
                &self.latitude,
                &self.longitude,
            ]
            .into_iter()
            .flatten(),
        )
    }

    fn for_each_channel(&mut self, mut f: impl FnMut(&mut Vec<f64>)) {
        f(&mut self.distance);
        for channel in [
            &mut self.time,
            &mut self.velocity,
            &mut self.heartrate,
            &mut self.cadence,
            &mut self.altitude,
            &mut self.latitude,
            &mut self.longitude,
        ]
        .into_iter()
        .flatten()
        {
            f(channel);
        }
    }

    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Elapsed seconds at `index`. Without a time channel the index itself
    /// is used, i.e. the recording is assumed to be sampled at 1 Hz.
    pub fn time_at(&self, index: usize) -> f64 {
        match &self.time {
            Some(time) => time[index],
            None => index as f64,
        }
    }

    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    pub fn time(&self) -> Option<&[f64]> {
        self.time.as_deref()
    }

    pub fn velocity(&self) -> Option<&[f64]> {
        self.velocity.as_deref()
    }

    pub fn heartrate(&self) -> Option<&[f64]> {
        self.heartrate.as_deref()
    }

    pub fn cadence(&self) -> Option<&[f64]> {
        self.cadence.as_deref()
    }

    pub fn altitude(&self) -> Option<&[f64]> {
        self.altitude.as_deref()
    }

    pub fn latitude(&self) -> Option<&[f64]> {
        self.latitude.as_deref()
    }

    pub fn longitude(&self) -> Option<&[f64]> {
        self.longitude.as_deref()
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        if index >= self.len() {
            return None;
        }
        let at = |channel: &Option<Vec<f64>>| {
            channel
                .as_ref()
                .map(|values| values[index])
                .filter(|v| v.is_finite())
        };
        Some(Sample {
            index,
            time: self.time_at(index),
            distance: self.distance[index],
            velocity: at(&self.velocity),
            heartrate: at(&self.heartrate),
            cadence: at(&self.cadence),
            altitude: at(&self.altitude),
            latitude: at(&self.latitude),
            longitude: at(&self.longitude),
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).filter_map(|idx| self.sample(idx))
    }

    /// Largest cumulative distance in the series, 0 when empty.
    pub fn total_distance(&self) -> f64 {
        self.distance
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(0.0, f64::max)
    }

    /// Elapsed seconds between the first and last sample.
    pub fn duration(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.time_at(self.len() - 1) - self.time_at(0)).max(0.0)
    }

    /// Copies samples `start..=end` into a new series.
    ///
    /// When `start > 0` the copy is re-originated: time and distance are
    /// shifted so the first retained sample sits at 0 s / 0 m. Out of range
    /// bounds are clamped; an inverted range yields an empty series.
    pub fn slice(&self, start: usize, end: usize) -> Series {
        if self.is_empty() || start > end || start >= self.len() {
            return Series::default();
        }
        let end = end.min(self.len() - 1);
        let mut sliced = self.clone();
        sliced.for_each_channel(|channel| {
            channel.truncate(end + 1);
            channel.drain(..start);
        });

        if start > 0 {
            if let Some(time) = sliced.time.as_mut() {
                let origin = time[0];
                time.iter_mut().for_each(|t| *t -= origin);
            }
            let origin = sliced.distance[0];
            sliced.distance.iter_mut().for_each(|d| *d -= origin);
        }
        sliced
    }

    /// Returns a copy with every cumulative distance multiplied by `factor`.
    pub fn scale_distance(&self, factor: f64) -> Series {
        let mut scaled = self.clone();
        scaled.distance.iter_mut().for_each(|d| *d *= factor);
        scaled
    }
}

/// Arithmetic mean of the finite values, `None` when there are none.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
