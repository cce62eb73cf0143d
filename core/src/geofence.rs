//! Geofence evaluation.
//!
//! [`evaluate`] is a pure function of one sample and the fence. [`GeofenceMonitor`]
//! wraps it for a stream of samples: it skips exact repeats and decides which
//! observations are worth reporting upstream. Nothing it remembers affects the
//! status it computes.

use clara_types::{Coordinate, CoordinateError, EARTH_RADIUS_METERS, Geofence, GeofenceStatus};
use serde::{Deserialize, Serialize};

/// Great-circle distance between two points in meters.
#[must_use]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// `Inside` iff the point is strictly closer than the radius.
#[must_use]
pub fn evaluate(point: Coordinate, fence: &Geofence) -> GeofenceStatus {
    GeofenceStatus::from_in_range(haversine_distance(point, fence.center()) < fence.radius_meters())
}

/// Validates raw degrees before evaluating.
pub fn evaluate_raw(
    latitude: f64,
    longitude: f64,
    fence: &Geofence,
) -> Result<GeofenceStatus, CoordinateError> {
    Ok(evaluate(Coordinate::new(latitude, longitude)?, fence))
}

/// Which observations get sent to the reporting backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPolicy {
    /// Report while outside, and on every status change.
    #[default]
    OutsideOrChange,
    /// Report every evaluated sample.
    Always,
    Never,
}

impl ReportPolicy {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outside_or_change" | "outside-or-change" | "default" => Some(Self::OutsideOrChange),
            "always" => Some(Self::Always),
            "never" | "off" => Some(Self::Never),
            _ => None,
        }
    }

    #[must_use]
    pub fn should_report(self, status: GeofenceStatus, changed: bool) -> bool {
        match self {
            Self::OutsideOrChange => !status.is_inside() || changed,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Result of evaluating one new sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub point: Coordinate,
    pub status: GeofenceStatus,
    pub distance_meters: f64,
    /// First observation, or status differs from the previous one.
    pub changed: bool,
    pub should_report: bool,
}

#[derive(Debug, Clone)]
pub struct GeofenceMonitor {
    fence: Geofence,
    policy: ReportPolicy,
    dedupe: bool,
    previous_point: Option<Coordinate>,
    previous_status: Option<GeofenceStatus>,
}

impl GeofenceMonitor {
    #[must_use]
    pub fn new(fence: Geofence, policy: ReportPolicy) -> Self {
        Self {
            fence,
            policy,
            dedupe: true,
            previous_point: None,
            previous_status: None,
        }
    }

    /// Recompute on every sample, including exact repeats.
    #[must_use]
    pub fn without_dedupe(mut self) -> Self {
        self.dedupe = false;
        self
    }

    #[must_use]
    pub fn fence(&self) -> &Geofence {
        &self.fence
    }

    #[must_use]
    pub fn policy(&self) -> ReportPolicy {
        self.policy
    }

    /// Last computed status; `None` before the first sample.
    #[must_use]
    pub fn status(&self) -> Option<GeofenceStatus> {
        self.previous_status
    }

    /// Evaluates `point`. Returns `None` when dedupe is on and `point` repeats the last sample.
    pub fn observe(&mut self, point: Coordinate) -> Option<Observation> {
        if self.dedupe && self.previous_point == Some(point) {
            tracing::trace!(%point, "Skipping repeated location sample");
            return None;
        }

        let distance_meters = haversine_distance(point, self.fence.center());
        let status = GeofenceStatus::from_in_range(distance_meters < self.fence.radius_meters());
        let changed = self.previous_status != Some(status);

        self.previous_point = Some(point);
        self.previous_status = Some(status);

        if changed {
            tracing::info!(%point, %status, distance_meters, "Geofence status changed");
        }

        Some(Observation {
            point,
            status,
            distance_meters,
            changed,
            should_report: self.policy.should_report(status, changed),
        })
    }
}
