use fabkit_core::{JobOutcome, JobState, OutputKind};
use fabkit_export::ExportConfig;
use fabkit_geometry::{Design, Expr, Shape};
use tempfile::TempDir;

use super::{cube_design, entries, exporter, finish};

#[test]
fn raster_export_completes() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("out.png");

    let handle = exporter()
        .start_export(cube_design(), &dest, ExportConfig::new().with_resolution(10.0))
        .expect("start");
    assert_eq!(handle.kind(), OutputKind::RasterImage);

    assert_eq!(finish(&handle), JobOutcome::Completed);
    assert_eq!(handle.progress(), 100);
    assert_eq!(handle.state(), JobState::Completed);
    assert!(handle.is_progress_closed());

    let bytes = std::fs::read(&dest).expect("png written");
    assert!(!bytes.is_empty());
    let img = image::load_from_memory(&bytes).expect("decode").to_rgb8();
    assert_eq!(img.dimensions(), (100, 100));
    assert_eq!(img.get_pixel(50, 50).0, [255, 255, 255]);
    assert_eq!(entries(dir.path()), vec!["out.png".to_string()]);
}

#[test]
fn mesh_export_cancelled_right_after_start() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("out.stl");

    let handle = exporter()
        .start_export(cube_design(), &dest, ExportConfig::new().with_resolution(10.0))
        .expect("start");
    handle.cancel();

    assert_eq!(finish(&handle), JobOutcome::Cancelled);
    assert_eq!(handle.state(), JobState::Cancelled);
    assert!(handle.progress() < 100);
    assert!(!dest.exists());
    assert!(entries(dir.path()).is_empty());
}

#[test]
fn outline_export_groups_shapes_in_order() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("out.svg");
    let design = Design::default()
        .with_shape(Shape::new("red", Expr::circle([0.0, 0.0], 2.0)).with_color([255, 0, 0]))
        .with_shape(Shape::new("plain", Expr::rectangle([4.0, -1.0], [7.0, 1.0])))
        .with_shape(Shape::new("blue", Expr::circle([10.0, 0.0], 1.5)).with_color([0, 0, 255]));

    let handle = exporter()
        .start_export(design, &dest, ExportConfig::new().with_resolution(4.0))
        .expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);

    let text = std::fs::read_to_string(&dest).expect("svg written");
    assert_eq!(text.matches("<g ").count(), 3);
    assert_eq!(text.matches("</g>").count(), 3);

    let red = text.find(r##"<g id="red" data-color="#ff0000">"##).expect("red group");
    let plain = text.find(r##"<g id="plain" data-color="#000000">"##).expect("plain group");
    let blue = text.find(r##"<g id="blue" data-color="#0000ff">"##).expect("blue group");
    assert!(red < plain && plain < blue);
    assert!(text.matches("<polyline").count() >= 3);
    assert!(text.trim_end().ends_with("</svg>"));
}

#[test]
fn raw_field_export_round_trips() {
    use fabkit_core::CancellationToken;
    use fabkit_geometry::Field;

    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("part.asdf");
    let shape = Shape::new(
        "bracket",
        Expr::difference(
            Expr::cuboid([0.0, 0.0, 0.0], [6.0, 4.0, 2.0]),
            Expr::cylinder([3.0, 2.0, -1.0], 1.0, 4.0),
        ),
    );
    let design = Design::default().with_shape(shape.clone());
    let border = design.border();

    let handle = exporter()
        .start_export(design, &dest, ExportConfig::new().with_resolution(3.0))
        .expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);

    let loaded = Field::load(&dest).expect("load");
    let region = shape.region(border, 1.0, 3.0, false).expect("region");
    let direct = shape
        .build_field(&region, 1.0, &CancellationToken::new())
        .expect("field");
    assert_eq!(
        loaded.render(20.0, 30.0, 5.0).expect("render loaded"),
        direct.render(20.0, 30.0, 5.0).expect("render direct")
    );
}

#[test]
fn graph_dump_with_arrays() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("graph.dot");
    let design = Design::default()
        .with_shape(Shape::new("a", Expr::sphere([0.0; 3], 1.0)))
        .with_shape(Shape::new("b", Expr::cuboid([2.0; 3], [3.0; 3])));

    let handle = exporter()
        .start_export(design, &dest, ExportConfig::new().with_dot_arrays(true))
        .expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);

    let text = std::fs::read_to_string(&dest).expect("dot written");
    assert!(text.starts_with("digraph \"design\" {"));
    assert!(text.contains("\\n["));
    assert!(text.contains("peripheries=2"));
}

#[test]
fn heightmap_renders_combined_shape() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("height.png");
    let handle = exporter()
        .start_export(
            super::two_parts(),
            &dest,
            ExportConfig::new().with_resolution(4.0).with_heightmap(true),
        )
        .expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);

    let img = image::open(&dest).expect("decode").to_rgb8();
    // combined shape is untinted: every covered pixel is grey
    assert!(img.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    assert!(img.pixels().any(|p| p.0[0] > 0));
}

#[test]
fn free_function_uses_global_exporter() {
    let dir = TempDir::new().expect("tempdir");
    let dest = dir.path().join("global.dot");
    let handle = fabkit_export::export(cube_design(), &dest, ExportConfig::new()).expect("start");
    assert_eq!(finish(&handle), JobOutcome::Completed);
    assert!(dest.exists());
}
