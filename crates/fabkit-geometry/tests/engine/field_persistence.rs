use fabkit_core::CancellationToken;
use fabkit_geometry::{Bounds, Design, Expr, Field, Shape};
use fabkit_core::DesignUnits;
use tempfile::TempDir;

fn bracket() -> Shape {
    let plate = Expr::cuboid([0.0, 0.0, 0.0], [6.0, 4.0, 1.0]);
    let hole = Expr::cylinder([3.0, 2.0, -1.0], 1.0, 3.0);
    Shape::new("bracket", Expr::difference(plate, hole))
}

#[test]
fn saved_field_renders_identically() {
    let shape = bracket();
    let region = shape.region(0.1, 1.0, 3.0, false).expect("region");
    let field = shape
        .build_field(&region, 1.0, &CancellationToken::new())
        .expect("field");

    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("bracket.asdf");
    field.save(&path).expect("save");
    let loaded = Field::load(&path).expect("load");

    assert_eq!(loaded, field);
    for (alpha, beta) in [(0.0, 0.0), (30.0, 45.0), (90.0, -20.0)] {
        let before = field.render(alpha, beta, 4.0).expect("render before");
        let after = loaded.render(alpha, beta, 4.0).expect("render after");
        assert_eq!(before, after, "views differ at alpha={} beta={}", alpha, beta);
    }
}

#[test]
fn inch_design_keeps_unit_scale_in_field() {
    let design = Design::new(DesignUnits::Inches)
        .with_shape(Shape::new("pin", Expr::sphere([0.0; 3], 0.25)));
    let shape = &design.shapes()[0];
    let region = shape
        .region(design.border(), design.mm_per_unit(), 2.0, false)
        .expect("region");
    let field = shape
        .build_field(&region, design.mm_per_unit(), &CancellationToken::new())
        .expect("field");
    assert_eq!(field.mm_per_unit(), 25.4);

    let mut buf = Vec::new();
    field.write_to(&mut buf).expect("encode");
    assert_eq!(Field::read_from(buf.as_slice()).expect("decode").mm_per_unit(), 25.4);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = Field::load(dir.path().join("nope.asdf")).unwrap_err();
    assert!(matches!(err, fabkit_core::GeometryError::Io { .. }));
}

#[test]
fn design_bounds_cover_all_shapes() {
    let design = Design::default()
        .with_shape(bracket())
        .with_shape(Shape::new(
            "peg",
            Expr::translate(Expr::cylinder([0.0; 3], 0.5, 2.0), [10.0, 0.0, 0.0]),
        ));
    let b = design.bounds().expect("bounds");
    assert_eq!(b, Bounds::new([0.0, -0.5, 0.0], [10.5, 4.0, 2.0]));
}
