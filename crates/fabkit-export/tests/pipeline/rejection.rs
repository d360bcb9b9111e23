use std::sync::Arc;

use fabkit_core::{ConfigError, DesignUnits, ExportError, JobOutcome};
use fabkit_export::ExportConfig;
use fabkit_geometry::{Design, Expr, Shape};
use tempfile::TempDir;

use super::{cube_design, entries, exporter, finish};

fn rejected(name: &str, config: ExportConfig) -> (ExportError, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let exporter = exporter();
    let err = exporter
        .start_export(cube_design(), dir.path().join(name), config)
        .expect_err("export should be rejected");
    assert!(err.is_rejection());
    assert!(exporter.event_bus().history(None).is_empty());
    assert!(entries(dir.path()).is_empty());
    (err, dir)
}

#[test]
fn unknown_suffix_is_unsupported() {
    let (err, _dir) = rejected("out.obj", ExportConfig::new().with_resolution(1.0));
    assert_eq!(
        err,
        ExportError::UnsupportedFormat {
            extension: "obj".to_string()
        }
    );
}

#[test]
fn missing_suffix_is_unsupported() {
    let (err, _dir) = rejected("out", ExportConfig::new().with_resolution(1.0));
    assert_eq!(
        err,
        ExportError::UnsupportedFormat {
            extension: String::new()
        }
    );
}

#[test]
fn missing_resolution_is_invalid() {
    for name in ["out.png", "out.svg", "out.stl", "out.asdf"] {
        let (err, _dir) = rejected(name, ExportConfig::new());
        assert_eq!(
            err,
            ExportError::InvalidConfiguration(ConfigError::MissingOption("resolution".to_string())),
            "{}",
            name
        );
    }
}

#[test]
fn non_positive_resolution_is_invalid() {
    for resolution in [0.0, -2.0, f64::NAN, f64::INFINITY] {
        let (err, _dir) = rejected("out.stl", ExportConfig::new().with_resolution(resolution));
        assert!(matches!(
            err,
            ExportError::InvalidConfiguration(ConfigError::OutOfRange { ref option, .. }) if option == "resolution"
        ));
    }
}

#[test]
fn empty_design_is_invalid() {
    let dir = TempDir::new().expect("tempdir");
    let err = exporter()
        .start_export(
            Arc::new(Design::default()),
            dir.path().join("out.dot"),
            ExportConfig::new(),
        )
        .expect_err("rejected");
    assert!(matches!(err, ExportError::InvalidConfiguration(ConfigError::InvalidValue { .. })));
}

#[test]
fn unusable_units_are_invalid() {
    for scale in [0.0, -1.0, f64::NAN] {
        let dir = TempDir::new().expect("tempdir");
        let design = Design::new(DesignUnits::Custom(scale))
            .with_shape(Shape::new("block", Expr::cuboid([0.0; 3], [1.0; 3])));
        for name in ["out.png", "out.dot"] {
            let err = exporter()
                .start_export(design.clone(), dir.path().join(name), ExportConfig::new().with_resolution(1.0))
                .expect_err("rejected");
            assert!(
                matches!(
                    err,
                    ExportError::InvalidConfiguration(ConfigError::OutOfRange { ref option, .. }) if option == "units"
                ),
                "{} at {}: {:?}",
                name,
                scale,
                err
            );
        }
        assert!(entries(dir.path()).is_empty());
    }
}

#[test]
fn options_from_keywords_reach_the_job() {
    let dir = TempDir::new().expect("tempdir");
    let err = ExportConfig::from_options([("resolution", "2"), ("flatten", "yes")]).unwrap_err();
    assert_eq!(err, ConfigError::UnknownOption("flatten".to_string()));

    let config = ExportConfig::from_options([("resolution", "2"), ("use_fast_triangulation", "true")])
        .expect("options");
    let handle = exporter()
        .start_export(cube_design(), dir.path().join("OUT.STL"), config)
        .expect("suffix match ignores case");
    assert_eq!(finish(&handle), JobOutcome::Completed);
}
