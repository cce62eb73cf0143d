//! Core domain types for Clara.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod chat;
mod family;
mod geo;
mod ids;

pub use chat::{ChatRequest, ChatResponse, ChatRole, ChatTurn, GreetingResponse};
pub use family::{EmptyNameError, FamilyError, MY_NAME, Person, PersonName, RelationSet};
pub use geo::{
    Coordinate, CoordinateError, EARTH_RADIUS_METERS, Geofence, GeofenceReport, GeofenceStatus,
};
pub use ids::MessageId;
