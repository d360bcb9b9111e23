use std::collections::HashSet;
use std::sync::Arc;

use fabkit_core::{JobOutcome, JobState};
use fabkit_export::ExportConfig;
use fabkit_geometry::{Design, Expr, Shape};
use tempfile::TempDir;

use super::{entries, exporter, finish, two_parts};

#[test]
fn jobs_on_one_design_run_independently() {
    let dir = TempDir::new().expect("tempdir");
    let design = Arc::new(two_parts());
    let exporter = exporter();
    let config = ExportConfig::new().with_resolution(3.0);

    let names = ["a.png", "b.svg", "c.stl", "d.asdf", "e.dot", "f.stl"];
    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            exporter
                .start_export(design.clone(), dir.path().join(name), config.clone())
                .expect("start")
        })
        .collect();

    let ids: HashSet<_> = handles.iter().map(|h| h.id()).collect();
    assert_eq!(ids.len(), names.len());
    for handle in &handles {
        assert_eq!(finish(handle), JobOutcome::Completed, "{}", handle.destination().display());
    }
    let mut expected: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    expected.sort();
    assert_eq!(entries(dir.path()), expected);
}

#[test]
fn failing_and_cancelled_jobs_leave_others_alone() {
    let dir = TempDir::new().expect("tempdir");
    let exporter = exporter();
    let good = Arc::new(two_parts());
    let bad = Arc::new(Design::default().with_shape(Shape::new("flat", Expr::circle([0.0, 0.0], 1.0))));
    let config = ExportConfig::new().with_resolution(3.0);

    let cancelled = exporter
        .prepare(good.clone(), dir.path().join("cancelled.stl"), config.clone())
        .expect("prepare");
    cancelled.handle().cancel();
    let cancelled = cancelled.spawn().expect("spawn");
    let failed = exporter
        .start_export(bad, dir.path().join("failed.stl"), config.clone())
        .expect("start");
    let done = exporter
        .start_export(good, dir.path().join("done.stl"), config)
        .expect("start");

    assert_eq!(finish(&cancelled), JobOutcome::Cancelled);
    assert!(matches!(finish(&failed), JobOutcome::Failed(_)));
    assert_eq!(finish(&done), JobOutcome::Completed);
    assert_eq!(done.state(), JobState::Completed);
    assert_eq!(entries(dir.path()), vec!["done.stl".to_string()]);
}
