use chart_templates::core::Bounds;
use chart_templates::layout::{
    LabelPlacementConfig, LabelPosition, PointLabel, StackedLabel, assignment_cost,
    place_point_labels, resolve_vertical_collisions,
};
use proptest::prelude::*;

fn brute_force_minimum(
    labels: &[PointLabel],
    polyline: &[(f64, f64)],
    config: LabelPlacementConfig,
) -> f64 {
    let n = labels.len();
    let mut best = f64::INFINITY;
    for code in 0..3_usize.pow(n as u32) {
        let mut rest = code;
        let positions: Vec<LabelPosition> = (0..n)
            .map(|_| {
                let position = LabelPosition::CANDIDATES[rest % 3];
                rest /= 3;
                position
            })
            .collect();
        let cost = assignment_cost(labels, polyline, config, &positions).expect("cost");
        best = best.min(cost);
    }
    best
}

#[test]
fn lone_label_goes_above_its_point() {
    let labels = [PointLabel::new((50.0, 50.0), 20.0, 10.0)];
    let placed =
        place_point_labels(&labels, &[(50.0, 50.0)], LabelPlacementConfig::default())
            .expect("placement");

    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].position, LabelPosition::Above);
    let bounds = placed[0].bounds.expect("visible label has bounds");
    assert!(bounds.y1 <= 50.0 - 6.0 + 1e-9);
}

#[test]
fn crowded_neighbours_split_above_and_below() {
    let anchors = [(100.0, 100.0), (110.0, 100.0)];
    let labels: Vec<PointLabel> = anchors
        .iter()
        .map(|&anchor| PointLabel::new(anchor, 40.0, 10.0))
        .collect();
    let placed =
        place_point_labels(&labels, &anchors, LabelPlacementConfig::default()).expect("placement");

    assert!(placed.iter().all(|label| label.is_visible()));
    assert_ne!(placed[0].position, placed[1].position);
    let a = placed[0].bounds.expect("bounds");
    let b = placed[1].bounds.expect("bounds");
    assert_eq!(a.intersection_area(b), 0.0);
}

#[test]
fn labels_that_cannot_stay_in_bounds_are_hidden() {
    let anchors = [(50.0, 100.0), (120.0, 100.0)];
    let labels: Vec<PointLabel> = anchors
        .iter()
        .map(|&anchor| PointLabel::new(anchor, 30.0, 15.0))
        .collect();
    let config = LabelPlacementConfig {
        hide_cost_factor: 0.5,
        ..LabelPlacementConfig::default()
    }
    .with_bounds(Bounds::new(0.0, 90.0, 200.0, 110.0));
    let placed = place_point_labels(&labels, &anchors, config).expect("placement");

    assert_eq!(placed.len(), 2);
    for label in &placed {
        assert_eq!(label.position, LabelPosition::Hidden);
        assert!(label.bounds.is_none());
    }
}

#[test]
fn labels_avoid_the_series_line() {
    // A steep drop right after the point runs through the box below it.
    let polyline = [(100.0, 100.0), (104.0, 140.0)];
    let labels = [PointLabel::new((100.0, 100.0), 20.0, 10.0)];
    let config = LabelPlacementConfig {
        below_penalty: 0.0,
        ..LabelPlacementConfig::default()
    };
    let placed = place_point_labels(&labels, &polyline, config).expect("placement");
    assert_eq!(placed[0].position, LabelPosition::Above);

    let rising = [(100.0, 100.0), (104.0, 60.0)];
    let placed = place_point_labels(&labels, &rising, config).expect("placement");
    assert_eq!(placed[0].position, LabelPosition::Below);
}

#[test]
fn placement_rejects_non_finite_input() {
    let labels = [PointLabel::new((f64::NAN, 0.0), 10.0, 10.0)];
    assert!(place_point_labels(&labels, &[], LabelPlacementConfig::default()).is_err());

    let config = LabelPlacementConfig {
        offset: -1.0,
        ..LabelPlacementConfig::default()
    };
    let labels = [PointLabel::new((0.0, 0.0), 10.0, 10.0)];
    assert!(place_point_labels(&labels, &[], config).is_err());
}

#[test]
fn assignment_cost_needs_one_position_per_label() {
    let labels = [
        PointLabel::new((0.0, 0.0), 10.0, 10.0),
        PointLabel::new((20.0, 0.0), 10.0, 10.0),
    ];
    let result = assignment_cost(
        &labels,
        &[],
        LabelPlacementConfig::default(),
        &[LabelPosition::Above],
    );
    assert!(result.is_err());
}

#[test]
fn stacked_labels_without_collisions_stay_put() {
    let labels = [
        StackedLabel::new(10.0, 8.0),
        StackedLabel::new(40.0, 8.0),
        StackedLabel::new(90.0, 8.0),
    ];
    let centres = resolve_vertical_collisions(&labels, 0.0, 100.0, 2.0);
    assert_eq!(centres, vec![10.0, 40.0, 90.0]);
}

#[test]
fn colliding_pair_spreads_around_its_mean() {
    let labels = [StackedLabel::new(50.0, 10.0), StackedLabel::new(52.0, 10.0)];
    let centres = resolve_vertical_collisions(&labels, 0.0, 100.0, 0.0);
    assert!((centres[0] - 46.0).abs() < 1e-9);
    assert!((centres[1] - 56.0).abs() < 1e-9);
}

#[test]
fn stack_is_pushed_back_inside_the_range() {
    let labels = [StackedLabel::new(98.0, 10.0), StackedLabel::new(99.0, 10.0)];
    let centres = resolve_vertical_collisions(&labels, 0.0, 100.0, 2.0);
    assert!((centres[1] - 95.0).abs() < 1e-9);
    assert!((centres[0] - 83.0).abs() < 1e-9);
}

proptest! {
    #[test]
    fn viterbi_matches_brute_force(
        points in prop::collection::vec((0.0f64..200.0, 0.0f64..200.0), 1..7),
        width in 4.0f64..60.0,
        height in 4.0f64..20.0,
        bounded in any::<bool>(),
    ) {
        let mut polyline = points.clone();
        polyline.sort_by(|a, b| a.0.total_cmp(&b.0));
        let labels: Vec<PointLabel> = polyline
            .iter()
            .map(|&anchor| PointLabel::new(anchor, width, height))
            .collect();
        let mut config = LabelPlacementConfig::default();
        if bounded {
            config = config.with_bounds(Bounds::new(0.0, 0.0, 200.0, 200.0));
        }

        let placed = place_point_labels(&labels, &polyline, config).expect("placement");
        prop_assert_eq!(placed.len(), labels.len());
        for (i, label) in placed.iter().enumerate() {
            prop_assert_eq!(label.index, i);
            prop_assert_eq!(label.bounds.is_some(), label.is_visible());
        }

        let positions: Vec<LabelPosition> = placed.iter().map(|label| label.position).collect();
        let chosen = assignment_cost(&labels, &polyline, config, &positions).expect("cost");
        let optimum = brute_force_minimum(&labels, &polyline, config);
        prop_assert!((chosen - optimum).abs() <= 1e-6 * (1.0 + optimum.abs()),
            "chosen {} vs optimum {}", chosen, optimum);
    }

    #[test]
    fn resolved_labels_keep_order_and_gap(
        items in prop::collection::vec((0.0f64..300.0, 4.0f64..20.0), 1..12),
        gap in 0.0f64..4.0,
    ) {
        let labels: Vec<StackedLabel> = items
            .iter()
            .map(|&(ideal, height)| StackedLabel::new(ideal, height))
            .collect();
        let (min, max) = (0.0, 400.0);
        let centres = resolve_vertical_collisions(&labels, min, max, gap);
        prop_assert_eq!(centres.len(), labels.len());

        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| labels[a].ideal.total_cmp(&labels[b].ideal));
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let needed = (labels[a].height + labels[b].height) / 2.0 + gap;
            prop_assert!(centres[b] - centres[a] >= needed - 1e-9);
        }
        for (label, centre) in labels.iter().zip(&centres) {
            prop_assert!(centre - label.height / 2.0 >= min - 1e-9);
            prop_assert!(centre + label.height / 2.0 <= max + 1e-9);
        }
    }
}
