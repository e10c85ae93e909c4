use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Live wpm sampled once per whole elapsed second
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WpmSeries {
    points: Vec<TimeSeriesPoint>,
}

impl WpmSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `wpm` if `elapsed_secs` has entered a second not sampled yet.
    /// Returns whether a point was added.
    pub fn sample(&mut self, elapsed_secs: f64, wpm: u32) -> bool {
        let second = elapsed_secs.floor();
        if second < 1.0 {
            return false;
        }
        if self.points.last().is_some_and(|p| p.t >= second) {
            return false;
        }
        self.points.push(TimeSeriesPoint::new(second, wpm as f64));
        true
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// X extent in seconds (at least 1) and the highest wpm seen
    pub fn bounds(&self, fallback_secs: f64) -> (f64, f64) {
        let duration = self.points.last().map_or(fallback_secs, |p| p.t).max(1.0);
        let highest = self.points.iter().map(|p| p.wpm).fold(0.0, f64::max);
        (duration, highest)
    }
}
