use std::sync::Arc;

use fabkit_core::{EventCategory, EventFilter, ExportEvent, JobOutcome};
use fabkit_export::{ExportConfig, JobHandle};
use fabkit_geometry::{Design, Expr, Shape};
use parking_lot::Mutex;
use tempfile::TempDir;

use super::{entries, exporter, finish, two_parts};

fn three_parts() -> Design {
    two_parts().with_shape(Shape::new("top", Expr::sphere([9.0, 1.0, 0.0], 1.0)))
}

fn percents(events: &[ExportEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            ExportEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}

#[test]
fn progress_is_monotonic_and_ends_at_100() {
    let dir = TempDir::new().expect("tempdir");
    for name in ["parts.png", "parts.svg", "parts.stl", "parts.asdf", "parts.dot"] {
        let exporter = exporter();
        let handle = exporter
            .start_export(three_parts(), dir.path().join(name), ExportConfig::new().with_resolution(3.0))
            .expect("start");
        assert_eq!(finish(&handle), JobOutcome::Completed, "{}", name);

        let history = exporter.event_bus().history(None);
        let values = percents(&history);
        assert!(!values.is_empty(), "{}", name);
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{}: {:?}", name, values);
        assert_eq!(values.last(), Some(&100), "{}", name);
        assert_eq!(values.iter().filter(|p| **p == 100).count(), 1);

        assert!(matches!(history.first(), Some(ExportEvent::Started { .. })));
        let finished: Vec<_> = history
            .iter()
            .filter(|e| matches!(e, ExportEvent::Finished { .. }))
            .collect();
        assert_eq!(finished.len(), 1, "{}", name);
        assert!(matches!(history.last(), Some(ExportEvent::Finished { .. })));
    }
}

#[test]
fn mesh_checkpoints_follow_stage_shares() {
    let dir = TempDir::new().expect("tempdir");
    let exporter = exporter();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    exporter.event_bus().subscribe(
        EventFilter::Categories(vec![EventCategory::Progress]),
        move |event| {
            if let ExportEvent::Progress { percent, .. } = event {
                sink.lock().push(percent);
            }
        },
    );

    let handle = exporter
        .start_export(three_parts(), dir.path().join("parts.stl"), ExportConfig::new().with_resolution(3.0))
        .expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);
    assert_eq!(*seen.lock(), vec![11, 22, 44, 55, 77, 88, 100]);
}

#[test]
fn cancel_mid_loop_skips_remaining_shapes() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("parts.stl");
    let exporter = exporter();

    let job = exporter
        .prepare(three_parts(), &dest, ExportConfig::new().with_resolution(3.0))
        .expect("prepare");
    let slot: Arc<Mutex<Option<JobHandle>>> = Arc::new(Mutex::new(Some(job.handle())));
    let target = slot.clone();
    exporter.event_bus().subscribe(EventFilter::Job(job.handle().id()), move |event| {
        if let ExportEvent::Progress { .. } = event {
            if let Some(handle) = target.lock().as_ref() {
                handle.cancel();
            }
        }
    });

    let handle = job.spawn().expect("spawn");
    assert_eq!(finish(&handle), JobOutcome::Cancelled);
    assert_eq!(handle.progress(), 11);
    assert_eq!(percents(&exporter.event_bus().history(None)), vec![11]);
    assert!(entries(dir.path()).is_empty());
    slot.lock().take();
}

#[test]
fn cancel_is_idempotent() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("parts.svg");
    let exporter = exporter();
    let job = exporter
        .prepare(three_parts(), &dest, ExportConfig::new().with_resolution(3.0))
        .expect("prepare");
    let handle = job.handle();
    handle.cancel();
    handle.cancel();
    let spawned = job.spawn().expect("spawn");
    spawned.cancel();

    assert_eq!(finish(&handle), JobOutcome::Cancelled);
    assert_eq!(spawned.outcome(), Some(JobOutcome::Cancelled));
    assert!(percents(&exporter.event_bus().history(None)).is_empty());
    assert!(!dest.exists());
}
