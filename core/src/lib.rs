//! Core domain logic for Clara.
//!
//! This crate holds everything the companion app decides on its own, with no IO:
//! geofence evaluation, the family tree and its layout, the scripted onboarding
//! dialogue, the assistant chat transcript, and the emergency contact list.

pub mod assistant;
pub mod contacts;
pub mod dialogue;
mod family;
pub mod geofence;
mod layout;
pub mod transcript;

pub use assistant::{ASSISTANT_FALLBACK, ASSISTANT_GREETING, AssistantChat};
pub use contacts::{DEFAULT_CONTACTS, EmergencyContact, Platform};
pub use dialogue::{Dialogue, DialogueError, NodeId, Screen, Transition};
pub use family::{FamilyTree, RelationPolicy};
pub use geofence::{
    GeofenceMonitor, Observation, ReportPolicy, evaluate, evaluate_raw, haversine_distance,
};
pub use layout::{Connector, DESCENDANT_ANCHOR, FamilyLayout, LayoutNode};
pub use transcript::{Author, ChatMessage, ChatOption, Transcript};
