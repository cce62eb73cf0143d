mod assistant;
mod config;
mod family;
mod geofence;
