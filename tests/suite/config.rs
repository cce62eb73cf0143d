//! Configuration loading tests

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use clara_config::{API_URL_ENV, CONFIG_PATH_ENV, ClaraConfig, DEFAULT_API_URL};
use clara_core::ReportPolicy;
use clara_core::evaluate;
use clara_types::GeofenceStatus;

use crate::common::point;

#[test]
fn configured_fence_drives_evaluation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[geofence]\nlatitude = 51.5074\nlongitude = -0.1278\nradius_meters = 1000.0\nreport = \"never\""
    )
    .unwrap();

    let resolved = ClaraConfig::load_from(file.path())
        .unwrap()
        .unwrap()
        .resolved()
        .unwrap();
    assert_eq!(resolved.report_policy, ReportPolicy::Never);
    assert_eq!(
        evaluate(point(51.5080, -0.1280), &resolved.geofence),
        GeofenceStatus::Inside
    );
    assert_eq!(
        evaluate(point(43.7735, -79.5019), &resolved.geofence),
        GeofenceStatus::Outside
    );
}

#[test]
fn malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[geofence\nradius_meters = ").unwrap();
    assert!(ClaraConfig::load_from(file.path()).is_err());
}

fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn api_url_env_overrides_file() {
    let config = ClaraConfig::parse("[api]\nurl = \"http://from-file:9000\"\n").unwrap();

    let resolved = config
        .resolved_with(env_of(&[(API_URL_ENV, "http://from-env:7000")]))
        .unwrap();
    assert_eq!(resolved.api_url, "http://from-env:7000");

    let resolved = config.resolved_with(env_of(&[(API_URL_ENV, "   ")])).unwrap();
    assert_eq!(resolved.api_url, "http://from-file:9000");

    let resolved = config.resolved_with(env_of(&[])).unwrap();
    assert_eq!(resolved.api_url, "http://from-file:9000");
}

#[test]
fn blank_api_url_everywhere_falls_back_to_default() {
    let config = ClaraConfig::parse("[api]\nurl = \"${CLARA_TEST_HOST}\"\n").unwrap();
    let resolved = config.resolved_with(env_of(&[(API_URL_ENV, "")])).unwrap();
    assert_eq!(resolved.api_url, DEFAULT_API_URL);
}

#[test]
fn file_values_expand_variables() {
    let config = ClaraConfig::parse(
        "[api]\nurl = \"https://${CLARA_TEST_HOST}/v1\"\nuser_id = \"${CLARA_TEST_USER}\"\n",
    )
    .unwrap();
    let resolved = config
        .resolved_with(env_of(&[
            ("CLARA_TEST_HOST", "backend.example"),
            ("CLARA_TEST_USER", "patient_42"),
        ]))
        .unwrap();
    assert_eq!(resolved.api_url, "https://backend.example/v1");
    assert_eq!(resolved.user_id, "patient_42");
}

#[test]
fn config_path_env_redirects_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let custom = dir.path().join("custom.toml");
    let custom_str = custom.to_string_lossy().into_owned();

    let path = ClaraConfig::path_with(env_of(&[(CONFIG_PATH_ENV, custom_str.as_str())]));
    assert_eq!(path, Some(custom.clone()));

    let mut file = std::fs::File::create(&custom).unwrap();
    writeln!(file, "[api]\nuser_id = \"redirected\"").unwrap();
    let loaded = ClaraConfig::load_from(&path.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.resolved_with(env_of(&[])).unwrap().user_id, "redirected");

    let fallback = ClaraConfig::path_with(env_of(&[(CONFIG_PATH_ENV, " ")]));
    if let Some(fallback) = fallback {
        assert!(fallback.ends_with(PathBuf::from(".clara").join("config.toml")));
    }
}
