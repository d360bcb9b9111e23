//! Property-based tests for the region builder.

use fabkit_geometry::{compute_region, Bounds};
use proptest::prelude::*;

fn arb_bounds() -> impl Strategy<Value = Bounds> {
    (
        (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0),
        (0.1f64..10.0, 0.1f64..10.0, 0.1f64..10.0),
    )
        .prop_map(|((x, y, z), (dx, dy, dz))| Bounds::new([x, y, z], [x + dx, y + dy, z + dz]))
}

proptest! {
    #[test]
    fn region_contains_bounds(
        bounds in arb_bounds(),
        margin in 0.0f64..0.5,
        resolution in 0.05f64..0.5,
        unit in prop::sample::select(vec![1.0f64, 25.4, 0.5]),
    ) {
        let region = compute_region(&bounds, margin, unit, resolution, false).unwrap();
        for axis in 0..3 {
            prop_assert!(region.min[axis] <= bounds.min[axis]);
            prop_assert!(region.max[axis] >= bounds.max[axis]);
        }
        prop_assert!((region.scale - resolution * unit).abs() < 1e-9);
    }

    #[test]
    fn flatten_collapses_z(
        bounds in arb_bounds(),
        resolution in 0.05f64..2.0,
    ) {
        let region = compute_region(&bounds, 0.0, 1.0, resolution, true).unwrap();
        prop_assert_eq!(region.min[2], 0.0);
        prop_assert_eq!(region.max[2], 0.0);
        prop_assert_eq!(region.dims()[2], 1);
    }

    #[test]
    fn region_is_deterministic(
        bounds in arb_bounds(),
        margin in 0.0f64..0.5,
    ) {
        let a = compute_region(&bounds, margin, 1.0, 1.0, false).unwrap();
        let b = compute_region(&bounds, margin, 1.0, 1.0, false).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn non_positive_resolution_rejected(
        bounds in arb_bounds(),
        resolution in -10.0f64..=0.0,
    ) {
        prop_assert!(compute_region(&bounds, 0.0, 1.0, resolution, false).is_err());
    }

    #[test]
    fn inverted_bounds_rejected(
        bounds in arb_bounds(),
        axis in 0usize..3,
    ) {
        let mut inverted = bounds;
        std::mem::swap(&mut inverted.min[axis], &mut inverted.max[axis]);
        prop_assert!(compute_region(&inverted, 0.0, 1.0, 1.0, false).is_err());
    }
}
