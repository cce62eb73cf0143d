//! Geofence evaluation and reporting tests

use clara_api::spawn_geofence_report;
use clara_core::{GeofenceMonitor, ReportPolicy, evaluate, haversine_distance};
use clara_types::{GeofenceReport, GeofenceStatus};

use crate::common::{campus_fence, client_for, mount_geofence_sink, point, start_backend_mock};

#[test]
fn concrete_campus_cases() {
    let fence = campus_fence();
    assert_eq!(evaluate(point(43.7735, -79.5019), &fence), GeofenceStatus::Inside);
    assert_eq!(evaluate(point(43.80, -79.50), &fence), GeofenceStatus::Outside);
}

#[test]
fn symmetry_over_sample_grid() {
    let samples = [
        point(43.7735, -79.5019),
        point(-33.8688, 151.2093),
        point(89.9, 0.0),
        point(-89.9, 179.9),
        point(0.0, -180.0),
    ];
    for a in samples {
        for b in samples {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!((ab - ba).abs() < 1e-6, "{a} vs {b}: {ab} != {ba}");
            assert!(ab >= 0.0);
        }
        assert!(haversine_distance(a, a).abs() < 1e-9);
    }
}

#[tokio::test]
async fn monitor_reports_follow_policy() {
    let server = start_backend_mock().await;
    // inside (first), outside (change), outside (still outside); the second
    // inside sample is neither a change nor outside.
    mount_geofence_sink(&server, 3).await;
    let client = client_for(&server);

    let mut monitor = GeofenceMonitor::new(campus_fence(), ReportPolicy::OutsideOrChange);
    let mut handles = Vec::new();
    for sample in [
        point(43.7735, -79.5019),
        point(43.7736, -79.5019),
        point(43.80, -79.50),
        point(43.81, -79.50),
    ] {
        if let Some(obs) = monitor.observe(sample)
            && obs.should_report
        {
            handles.push(spawn_geofence_report(
                client.clone(),
                GeofenceReport::new(obs.status, obs.point),
            ));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn failed_report_is_swallowed() {
    // Nothing listening on this port.
    let client =
        clara_api::ApiClient::new("http://127.0.0.1:9", clara_api::ClientOptions::default())
            .unwrap();
    let mut monitor = GeofenceMonitor::new(campus_fence(), ReportPolicy::Always);
    let obs = monitor.observe(point(43.80, -79.50)).unwrap();

    spawn_geofence_report(client, GeofenceReport::new(obs.status, obs.point))
        .await
        .unwrap();
    assert_eq!(monitor.status(), Some(GeofenceStatus::Outside));
}
