use std::fs::File;
use std::sync::Arc;

use fabkit_core::{CancellationToken, ConfigError, ExportError, JobOutcome};
use fabkit_export::{ExportConfig, ExportSource};
use fabkit_geometry::{Expr, Field, Shape};
use tempfile::TempDir;

use super::{entries, exporter, finish};

fn ball_field() -> Arc<Field> {
    let shape = Shape::new("ball", Expr::sphere([0.0; 3], 2.0));
    let region = shape.region(0.1, 1.0, 4.0, false).expect("region");
    Arc::new(
        shape
            .build_field(&region, 1.0, &CancellationToken::new())
            .expect("field"),
    )
}

#[test]
fn field_exports_to_every_supported_kind() {
    let dir = TempDir::new().expect("tempdir");
    let field = ball_field();
    let exporter = exporter();
    let config = ExportConfig::new().with_resolution(4.0).with_view(30.0, 45.0);

    for name in ["view.png", "fast.stl", "copy.asdf"] {
        let handle = exporter
            .start_export(ExportSource::Field(field.clone()), dir.path().join(name), config.clone())
            .expect("start");
        assert_eq!(finish(&handle), JobOutcome::Completed, "{}", name);
        assert_eq!(handle.progress(), 100);
    }

    let view = image::open(dir.path().join("view.png")).expect("png").to_rgb8();
    assert_eq!(
        view.as_raw(),
        field.render(30.0, 45.0, 4.0).expect("render").to_rgb_image().as_raw()
    );

    let mut stl = File::open(dir.path().join("fast.stl")).expect("stl");
    let mesh = stl_io::read_stl(&mut stl).expect("read stl");
    assert_eq!(mesh.faces.len(), field.triangulate_fast().len());

    let copy = Field::load(dir.path().join("copy.asdf")).expect("load");
    assert_eq!(&copy, field.as_ref());
}

#[test]
fn field_progress_checkpoints() {
    let dir = TempDir::new().expect("tempdir");
    let expectations: [(&str, &[u8]); 3] = [
        ("view.png", &[90, 100]),
        ("fast.stl", &[60, 100]),
        ("copy.asdf", &[100]),
    ];
    for (name, expected) in expectations {
        let exporter = exporter();
        let handle = exporter
            .start_export(
                ball_field(),
                dir.path().join(name),
                ExportConfig::new().with_resolution(2.0),
            )
            .expect("start");
        assert_eq!(finish(&handle), JobOutcome::Completed);
        let seen: Vec<u8> = exporter
            .event_bus()
            .history(None)
            .iter()
            .filter_map(|e| match e {
                fabkit_core::ExportEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(seen, expected, "{}", name);
    }
}

#[test]
fn field_cannot_export_outlines_or_graphs() {
    let dir = TempDir::new().expect("tempdir");
    for (name, extension) in [("out.svg", "svg"), ("out.dot", "dot")] {
        let err = exporter()
            .start_export(ball_field(), dir.path().join(name), ExportConfig::new().with_resolution(1.0))
            .expect_err("rejected");
        assert_eq!(
            err,
            ExportError::UnsupportedFormat {
                extension: extension.to_string()
            }
        );
    }
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn field_raster_needs_resolution() {
    let dir = TempDir::new().expect("tempdir");
    let err = exporter()
        .start_export(ball_field(), dir.path().join("out.png"), ExportConfig::new())
        .expect_err("rejected");
    assert_eq!(
        err,
        ExportError::InvalidConfiguration(ConfigError::MissingOption("resolution".to_string()))
    );

    let handle = exporter()
        .start_export(ball_field(), dir.path().join("out.stl"), ExportConfig::new())
        .expect("mesh needs no resolution");
    assert_eq!(finish(&handle), JobOutcome::Completed);
}
