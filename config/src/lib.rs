//! Configuration for Clara.
//!
//! Settings live in `~/.clara/config.toml` (or the file named by `CLARA_CONFIG`).
//! Every section and key is optional; [`ClaraConfig::resolved`] fills in the
//! defaults and validates the geofence.
//!
//! String values may reference environment variables as `${NAME}`.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use clara_core::{RelationPolicy, ReportPolicy};
use clara_types::{Coordinate, CoordinateError, Geofence};

pub const CONFIG_PATH_ENV: &str = "CLARA_CONFIG";
pub const API_URL_ENV: &str = "CLARA_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER_ID: &str = "user_123";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// York University campus.
const DEFAULT_FENCE_LATITUDE: f64 = 43.7735;
const DEFAULT_FENCE_LONGITUDE: f64 = -79.5019;
const DEFAULT_FENCE_RADIUS_METERS: f64 = 500.0;

const DEFAULT_TIME_INTERVAL_MS: u64 = 1000;
const DEFAULT_DISTANCE_INTERVAL_M: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid geofence: {0}")]
    Geofence(#[from] CoordinateError),
    #[error("unknown report policy {0:?} (expected outside_or_change, always or never)")]
    ReportPolicy(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaraConfig {
    pub api: Option<ApiSection>,
    pub geofence: Option<GeofenceSection>,
    pub location: Option<LocationSection>,
    pub family: Option<FamilySection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSection {
    pub url: Option<String>,
    pub user_id: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeofenceSection {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub report: Option<String>,
    /// Skip exact repeat samples. The location source already drops samples
    /// closer than `[location] distance_interval_m` to the last one, so turning
    /// this off only changes anything when that interval is `0`.
    pub dedupe: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationSection {
    pub enabled: Option<bool>,
    pub accuracy: Option<Accuracy>,
    pub time_interval_ms: Option<u64>,
    pub distance_interval_m: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FamilySection {
    pub strict_relations: Option<bool>,
}

/// Requested accuracy of location samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Low,
    Balanced,
    #[default]
    High,
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Accuracy::Low => "low",
            Accuracy::Balanced => "balanced",
            Accuracy::High => "high",
        })
    }
}

/// Sampling thresholds for the location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSettings {
    /// `false` behaves as if location permission was denied.
    pub enabled: bool,
    pub accuracy: Accuracy,
    pub time_interval: Duration,
    pub distance_interval_m: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            accuracy: Accuracy::High,
            time_interval: Duration::from_millis(DEFAULT_TIME_INTERVAL_MS),
            distance_interval_m: DEFAULT_DISTANCE_INTERVAL_M,
        }
    }
}

/// Configuration with every default applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub user_id: String,
    pub request_timeout: Duration,
    pub geofence: Geofence,
    pub report_policy: ReportPolicy,
    pub dedupe: bool,
    pub location: LocationSettings,
    pub relation_policy: RelationPolicy,
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Replaces `${NAME}` with the value of the environment variable `NAME`.
/// Unset variables expand to the empty string.
pub fn expand_env_vars(value: &str) -> String {
    expand_vars_with(value, &env_lookup)
}

fn expand_vars_with(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        if let Some(end) = after.find('}') {
            let var = &after[..end];
            if !var.is_empty() {
                out.push_str(&lookup(var).unwrap_or_default());
            }
            rest = &after[end + 1..];
        } else {
            out.push_str(&rest[start..]);
            rest = "";
        }
    }
    out.push_str(rest);

    out
}

impl ClaraConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the config file. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(Some(config))
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Config file location with `lookup` standing in for the environment.
    #[must_use]
    pub fn path_with(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        config_path_with(&lookup, dirs::home_dir())
    }

    pub fn resolved(&self) -> Result<ResolvedConfig, ConfigError> {
        self.resolved_with(env_lookup)
    }

    /// Same as [`ClaraConfig::resolved`], reading variables through `lookup`.
    pub fn resolved_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let api = self.api.as_ref();
        let fence = self.geofence.as_ref();
        let location = self.location.as_ref();
        let expand = |raw: &str| expand_vars_with(raw, &lookup);

        let api_url = lookup(API_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| api.and_then(|a| a.url.as_deref()).map(expand))
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let user_id = api
            .and_then(|a| a.user_id.as_deref())
            .map(expand)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let request_timeout = Duration::from_secs(
            api.and_then(|a| a.timeout_secs)
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let center = Coordinate::new(
            fence
                .and_then(|f| f.latitude)
                .unwrap_or(DEFAULT_FENCE_LATITUDE),
            fence
                .and_then(|f| f.longitude)
                .unwrap_or(DEFAULT_FENCE_LONGITUDE),
        )?;
        let geofence = Geofence::new(
            center,
            fence
                .and_then(|f| f.radius_meters)
                .unwrap_or(DEFAULT_FENCE_RADIUS_METERS),
        )?;

        let report_policy = match fence.and_then(|f| f.report.as_deref()) {
            None => ReportPolicy::default(),
            Some(raw) => ReportPolicy::parse(raw)
                .ok_or_else(|| ConfigError::ReportPolicy(raw.to_string()))?,
        };

        let defaults = LocationSettings::default();
        let location = LocationSettings {
            enabled: location.and_then(|l| l.enabled).unwrap_or(defaults.enabled),
            accuracy: location
                .and_then(|l| l.accuracy)
                .unwrap_or(defaults.accuracy),
            time_interval: location
                .and_then(|l| l.time_interval_ms)
                .map_or(defaults.time_interval, Duration::from_millis),
            distance_interval_m: location
                .and_then(|l| l.distance_interval_m)
                .filter(|m| m.is_finite() && *m >= 0.0)
                .unwrap_or(defaults.distance_interval_m),
        };

        let relation_policy = if self
            .family
            .as_ref()
            .and_then(|f| f.strict_relations)
            .unwrap_or(false)
        {
            RelationPolicy::Strict
        } else {
            RelationPolicy::Unchecked
        };

        Ok(ResolvedConfig {
            api_url,
            user_id,
            request_timeout,
            geofence,
            report_policy,
            dedupe: fence.and_then(|f| f.dedupe).unwrap_or(true),
            location,
            relation_policy,
        })
    }
}

fn config_path() -> Option<PathBuf> {
    config_path_with(&env_lookup, dirs::home_dir())
}

fn config_path_with(
    lookup: &impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = lookup(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    home.map(|home| home.join(".clara").join("config.toml"))
}
