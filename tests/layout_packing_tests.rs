use approx::assert_relative_eq;
use chart_templates::core::PlotArea;
use chart_templates::layout::{
    CirclePackingConfig, TrianglePackingConfig, circles_overlap, fit_circles, fit_triangles,
    pack_circles, pack_triangles,
};
use proptest::prelude::*;

const EPS: f64 = 1e-6;

#[test]
fn circle_packing_keeps_input_order_and_radii() {
    let radii = [3.0, 10.0, 1.0, 7.5];
    let packed = pack_circles(&radii, CirclePackingConfig::default()).expect("packing");

    assert_eq!(packed.len(), radii.len());
    for (i, circle) in packed.iter().enumerate() {
        assert_eq!(circle.index, i);
        assert_eq!(circle.radius, radii[i]);
    }
    assert!(!circles_overlap(&packed, 0.0));
}

#[test]
fn single_circle_is_centred_on_origin() {
    let packed = pack_circles(&[5.0], CirclePackingConfig::default()).expect("packing");
    assert_eq!(packed.len(), 1);
    assert_relative_eq!(packed[0].x, 0.0, epsilon = EPS);
    assert_relative_eq!(packed[0].y, 0.0, epsilon = EPS);
}

#[test]
fn circle_packing_rejects_invalid_input() {
    assert!(pack_circles(&[1.0, f64::NAN], CirclePackingConfig::default()).is_err());
    assert!(pack_circles(&[-1.0], CirclePackingConfig::default()).is_err());
    let config = CirclePackingConfig {
        padding: -2.0,
        ..CirclePackingConfig::default()
    };
    assert!(pack_circles(&[1.0], config).is_err());
}

#[test]
fn empty_packings_are_empty() {
    assert!(
        pack_circles(&[], CirclePackingConfig::default())
            .expect("packing")
            .is_empty()
    );
    assert!(
        pack_triangles(&[], TrianglePackingConfig::default())
            .expect("packing")
            .is_empty()
    );
}

#[test]
fn zero_radius_circles_stay_at_origin_and_do_not_affect_the_fit() {
    let packed = pack_circles(&[3.0, 1.0, 0.0], CirclePackingConfig::default()).expect("packing");
    assert_eq!(packed[2].radius, 0.0);
    assert_eq!((packed[2].x, packed[2].y), (0.0, 0.0));

    let without = pack_circles(&[3.0, 1.0], CirclePackingConfig::default()).expect("packing");
    for (a, b) in packed.iter().zip(&without) {
        assert_relative_eq!(a.x, b.x, epsilon = EPS);
        assert_relative_eq!(a.y, b.y, epsilon = EPS);
    }

    let area = PlotArea::new(0.0, 0.0, 300.0, 200.0);
    let (_, with_zero) = fit_circles(&packed, area);
    let (_, plain) = fit_circles(&without, area);
    assert_relative_eq!(with_zero, plain, epsilon = EPS);
}

#[test]
fn all_zero_radii_fit_to_the_area_centre() {
    let packed = pack_circles(&[0.0, 0.0], CirclePackingConfig::default()).expect("packing");
    let (fitted, scale) = fit_circles(&packed, PlotArea::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(scale, 0.0);
    assert_eq!(fitted.len(), 2);
    assert!(fitted.iter().all(|c| (c.x, c.y, c.radius) == (50.0, 25.0, 0.0)));
}

#[test]
fn fitted_circles_fill_the_limiting_dimension() {
    let packed = pack_circles(&[4.0, 4.0], CirclePackingConfig::default()).expect("packing");
    let area = PlotArea::new(0.0, 0.0, 400.0, 400.0);
    let (fitted, scale) = fit_circles(&packed, area);

    let left = fitted
        .iter()
        .map(|c| c.x - c.radius)
        .fold(f64::INFINITY, f64::min);
    let right = fitted
        .iter()
        .map(|c| c.x + c.radius)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_relative_eq!(right - left, 400.0, epsilon = 1e-3);
    assert_relative_eq!(fitted[0].radius, 4.0 * scale, epsilon = EPS);
}

#[test]
fn triangle_packing_preserves_areas() {
    let areas = [120.0, 40.0, 300.0, 10.0];
    let packed = pack_triangles(&areas, TrianglePackingConfig::default()).expect("packing");

    assert_eq!(packed.len(), areas.len());
    for (i, triangle) in packed.iter().enumerate() {
        assert_eq!(triangle.index, i);
        assert_relative_eq!(triangle.area(), areas[i], max_relative = 1e-9);
    }
}

#[test]
fn largest_triangle_points_up_and_neighbours_alternate() {
    let packed =
        pack_triangles(&[50.0, 100.0, 25.0], TrianglePackingConfig::default()).expect("packing");
    // Placement runs largest first: 100 (up), 50 (down), 25 (up).
    assert!(packed[1].pointing_up);
    assert!(!packed[0].pointing_up);
    assert!(packed[2].pointing_up);
}

proptest! {
    #[test]
    fn packed_circles_never_overlap(
        radii in prop::collection::vec(0.5f64..40.0, 1..24),
        padding in 0.0f64..4.0,
    ) {
        let config = CirclePackingConfig { padding, ..CirclePackingConfig::default() };
        let packed = pack_circles(&radii, config).expect("packing");

        prop_assert_eq!(packed.len(), radii.len());
        prop_assert!(!circles_overlap(&packed, padding));
        for (i, circle) in packed.iter().enumerate() {
            prop_assert_eq!(circle.index, i);
            prop_assert_eq!(circle.radius, radii[i]);
            prop_assert!(circle.x.is_finite() && circle.y.is_finite());
        }
    }

    #[test]
    fn fitted_circles_stay_inside_the_plot(
        radii in prop::collection::vec(0.5f64..40.0, 1..16),
        width in 50.0f64..800.0,
        height in 50.0f64..600.0,
    ) {
        let packed = pack_circles(&radii, CirclePackingConfig::default()).expect("packing");
        let area = PlotArea::new(10.0, 20.0, width, height);
        let (fitted, scale) = fit_circles(&packed, area);

        prop_assert!(scale > 0.0);
        for (circle, radius) in fitted.iter().zip(&radii) {
            let tol = 1e-6 * (width + height);
            prop_assert!(circle.x - circle.radius >= area.x - tol);
            prop_assert!(circle.x + circle.radius <= area.right() + tol);
            prop_assert!(circle.y - circle.radius >= area.y - tol);
            prop_assert!(circle.y + circle.radius <= area.bottom() + tol);
            // Uniform scaling keeps area ratios between circles.
            prop_assert!((circle.radius - radius * scale).abs() <= 1e-9 * (1.0 + circle.radius));
        }
    }

    #[test]
    fn packed_triangles_never_overlap(
        areas in prop::collection::vec(5.0f64..500.0, 1..16),
        padding in 0.0f64..3.0,
    ) {
        let config = TrianglePackingConfig { padding, ..TrianglePackingConfig::default() };
        let packed = pack_triangles(&areas, config).expect("packing");

        prop_assert_eq!(packed.len(), areas.len());
        for (i, a) in packed.iter().enumerate() {
            prop_assert_eq!(a.index, i);
            for b in &packed[i + 1..] {
                prop_assert!(!a.overlaps(b, padding), "triangles {} and {} overlap", a.index, b.index);
            }
        }
    }

    #[test]
    fn fitted_triangles_stay_inside_the_plot(
        areas in prop::collection::vec(5.0f64..500.0, 1..12),
        width in 80.0f64..800.0,
        height in 40.0f64..400.0,
    ) {
        let packed = pack_triangles(&areas, TrianglePackingConfig::default()).expect("packing");
        let area = PlotArea::new(0.0, 0.0, width, height);
        let (fitted, scale) = fit_triangles(&packed, area);

        prop_assert!(scale > 0.0);
        for (triangle, original) in fitted.iter().zip(&packed) {
            let (x0, y0, x1, y1) = triangle.extent();
            let tol = 1e-6 * (width + height);
            prop_assert!(x0 >= -tol && x1 <= width + tol);
            prop_assert!(y0 >= -tol && y1 <= height + tol);
            prop_assert!((triangle.side - original.side * scale).abs() <= 1e-9 * (1.0 + triangle.side));
        }
    }
}
