//! Geographic primitives for the geofence evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("geofence radius must be a positive number of meters (got {0})")]
    InvalidRadius(f64),
}

/// A validated latitude/longitude pair in degrees.
///
/// Latitude is within `[-90, 90]` and longitude within `[-180, 180]`; both finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if lat_ok && lon_ok {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(CoordinateError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A circular fence around a fixed center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geofence {
    center: Coordinate,
    radius_meters: f64,
}

impl Geofence {
    pub fn new(center: Coordinate, radius_meters: f64) -> Result<Self, CoordinateError> {
        if radius_meters.is_finite() && radius_meters > 0.0 {
            Ok(Self {
                center,
                radius_meters,
            })
        } else {
            Err(CoordinateError::InvalidRadius(radius_meters))
        }
    }

    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeofenceStatus {
    Inside,
    Outside,
}

impl GeofenceStatus {
    #[must_use]
    pub const fn from_in_range(in_range: bool) -> Self {
        if in_range { Self::Inside } else { Self::Outside }
    }

    #[must_use]
    pub const fn is_inside(self) -> bool {
        matches!(self, Self::Inside)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inside => "Inside Geofence",
            Self::Outside => "Outside Geofence",
        }
    }
}

impl fmt::Display for GeofenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of `POST /geofence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceReport {
    pub in_range: bool,
    pub location: Coordinate,
}

impl GeofenceReport {
    #[must_use]
    pub fn new(status: GeofenceStatus, location: Coordinate) -> Self {
        Self {
            in_range: status.is_inside(),
            location,
        }
    }
}
