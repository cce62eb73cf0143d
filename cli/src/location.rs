//! Line-based location source.
//!
//! Samples arrive as `lat,lon` lines. [`SampleFilter`] applies the configured
//! sampling thresholds: samples that moved less than the distance interval are
//! dropped, and delivery is held back until the time interval has passed since
//! the previous delivered sample.

use std::time::{Duration, Instant};

use thiserror::Error;

use clara_config::LocationSettings;
use clara_core::haversine_distance;
use clara_types::{Coordinate, CoordinateError};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("expected `latitude,longitude`, got {0:?}")]
    Malformed(String),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

pub fn parse_sample(line: &str) -> Result<Coordinate, SampleError> {
    let malformed = || SampleError::Malformed(line.trim().to_string());
    let (lat, lon) = line
        .split_once(',')
        .or_else(|| line.trim().split_once(char::is_whitespace))
        .ok_or_else(malformed)?;
    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
    Ok(Coordinate::new(lat, lon)?)
}

#[derive(Debug)]
pub struct SampleFilter {
    settings: LocationSettings,
    last: Option<(Coordinate, Instant)>,
}

impl SampleFilter {
    pub fn new(settings: LocationSettings) -> Self {
        Self {
            settings,
            last: None,
        }
    }

    /// Whether `point` moved far enough from the last delivered sample.
    pub fn admits(&self, point: Coordinate) -> bool {
        match self.last {
            None => true,
            Some((prev, _)) => {
                haversine_distance(prev, point) >= self.settings.distance_interval_m
            }
        }
    }

    /// How long to hold a sample before delivering it at `now`.
    pub fn hold_for(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some((_, at)) => self
                .settings
                .time_interval
                .saturating_sub(now.saturating_duration_since(at)),
        }
    }

    pub fn delivered(&mut self, point: Coordinate, at: Instant) {
        self.last = Some((point, at));
    }
}
