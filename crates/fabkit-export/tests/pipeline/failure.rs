use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fabkit_core::{EventFilter, ExportError, ExportEvent, GeometryError, JobOutcome, JobState};
use fabkit_export::ExportConfig;
use fabkit_geometry::{Design, Expr, Shape};
use tempfile::TempDir;

use super::{cube_design, entries, exporter, finish};

fn failure(design: Design, name: &str) -> (ExportError, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let handle = exporter()
        .start_export(design, dir.path().join(name), ExportConfig::new().with_resolution(2.0))
        .expect("start");
    let outcome = finish(&handle);
    assert_eq!(handle.state(), JobState::Failed);
    assert!(handle.progress() < 100);
    assert!(entries(dir.path()).is_empty());
    match outcome {
        JobOutcome::Failed(err) => (err, dir),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn unbounded_shape_fails_with_its_name() {
    let design = Design::default()
        .with_shape(Shape::new("ok", Expr::sphere([0.0; 3], 1.0)))
        .with_shape(Shape::new("floor", Expr::half_space([0.0, 0.0, 1.0], 0.0)));
    for name in ["out.png", "out.svg", "out.stl"] {
        let (err, _dir) = failure(design.clone(), name);
        match err {
            ExportError::Geometry(GeometryError::DegenerateBounds { shape, .. }) => {
                assert_eq!(shape, "floor", "{}", name)
            }
            other => panic!("{}: unexpected {:?}", name, other),
        }
    }
}

#[test]
fn bad_parameter_fails_as_evaluation_error() {
    let design = Design::default().with_shape(Shape::new("broken", Expr::sphere([0.0; 3], f64::NAN)));
    let (err, _dir) = failure(design, "out.stl");
    assert!(matches!(
        err,
        ExportError::Geometry(GeometryError::Evaluation { ref shape, .. }) if shape == "broken"
    ));
}

#[test]
fn planar_shape_cannot_be_meshed() {
    let design = Design::default().with_shape(Shape::new("disc", Expr::circle([0.0, 0.0], 1.0)));
    let (err, _dir) = failure(design, "disc.stl");
    assert!(matches!(err, ExportError::Geometry(GeometryError::DegenerateBounds { .. })));
}

#[test]
fn unwritable_destination_fails_with_io() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("missing").join("out.dot");
    let handle = exporter()
        .start_export(cube_design(), &dest, ExportConfig::new())
        .expect("start");
    match finish(&handle) {
        JobOutcome::Failed(ExportError::Io { path, .. }) => assert_eq!(path, dest),
        other => panic!("expected io failure, got {:?}", other),
    }
    assert!(!dest.exists());
}

#[test]
fn panicking_subscriber_fails_the_job_once() {
    let dir = TempDir::new().expect("tempdir");
    let exporter = exporter();
    let finished = Arc::new(AtomicUsize::new(0));
    let count = finished.clone();
    exporter.event_bus().subscribe(EventFilter::All, move |event| {
        if let ExportEvent::Finished { .. } = event {
            count.fetch_add(1, Ordering::SeqCst);
        }
        panic!("subscriber failure");
    });

    let dest = dir.path().join("out.dot");
    let handle = exporter
        .start_export(cube_design(), &dest, ExportConfig::new())
        .expect("start");
    let outcome = finish(&handle);
    assert_eq!(
        outcome,
        JobOutcome::Failed(ExportError::WorkerPanic {
            reason: "subscriber failure".to_string()
        })
    );
    assert_eq!(handle.state(), JobState::Failed);
    assert!(handle.is_progress_closed());
    assert_eq!(handle.wait(), outcome);
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn subscriber_panic_after_commit_keeps_the_artifact() {
    let dir = TempDir::new().expect("tempdir");
    let exporter = exporter();
    exporter.event_bus().subscribe(EventFilter::All, |event| {
        if let ExportEvent::Progress { percent: 100, .. } = event {
            panic!("late subscriber failure");
        }
    });

    let dest = dir.path().join("out.dot");
    let handle = exporter
        .start_export(cube_design(), &dest, ExportConfig::new())
        .expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);
    assert_eq!(handle.state(), JobState::Completed);
    assert!(dest.exists());
    assert_eq!(entries(dir.path()), vec!["out.dot".to_string()]);
}
