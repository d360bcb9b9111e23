use std::time::{Duration, Instant};

use fabkit_core::{CancellationToken, GeometryError};
use fabkit_geometry::{compute_region, Bounds, Expr, Shape};

fn heavy_shape() -> Shape {
    let mut expr = Expr::sphere([0.0; 3], 1.0);
    for i in 0..24 {
        let offset = f64::from(i) * 0.05;
        expr = Expr::union(expr, Expr::sphere([offset, 0.0, 0.0], 1.0));
    }
    Shape::new("blob", expr)
}

#[test]
fn hard_token_stops_field_build_mid_stage() {
    let shape = heavy_shape();
    let region = compute_region(&Bounds::new([-2.0; 3], [3.0; 3]), 0.0, 1.0, 40.0, false)
        .expect("region");
    let token = CancellationToken::new();
    let remote = token.clone();

    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });
    let started = Instant::now();
    let result = shape.build_field(&region, 1.0, &token);
    canceller.join().ok();

    assert_eq!(result, Err(GeometryError::Interrupted));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn every_interruptible_stage_honours_a_set_token() {
    let shape = Shape::new("puck", Expr::cylinder([0.0; 3], 2.0, 1.0));
    let region = shape.region(0.1, 1.0, 4.0, false).expect("region");
    let field = shape
        .build_field(&region, 1.0, &CancellationToken::new())
        .expect("field");

    let set = CancellationToken::new();
    set.cancel();
    assert_eq!(shape.render(&region, 1.0, &set), Err(GeometryError::Interrupted));
    assert_eq!(shape.build_field(&region, 1.0, &set), Err(GeometryError::Interrupted));
    assert_eq!(field.contour(&set), Err(GeometryError::Interrupted));
    assert_eq!(field.triangulate(&set), Err(GeometryError::Interrupted));

    // the approximate variant has no token and always completes
    assert!(!field.triangulate_fast().is_empty());
}
