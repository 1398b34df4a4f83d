use approx::assert_relative_eq;
use chart_templates::core::{
    BandScale, LinearScale, SqrtScale, nice_step, nice_ticks, parse_temporal, temporal_ticks,
    tick_target_count,
};
use proptest::prelude::*;

#[test]
fn linear_scale_maps_and_inverts() {
    let scale = LinearScale::new(0.0, 100.0)
        .expect("valid scale")
        .with_range(0.0, 500.0);
    assert_relative_eq!(scale.map(50.0), 250.0);
    assert_relative_eq!(scale.invert(250.0).expect("invert"), 50.0);

    // Vertical axes run bottom-up.
    let flipped = LinearScale::new(0.0, 10.0)
        .expect("valid scale")
        .with_range(300.0, 100.0);
    assert_relative_eq!(flipped.map(0.0), 300.0);
    assert_relative_eq!(flipped.map(10.0), 100.0);
}

#[test]
fn linear_scale_rejects_degenerate_domains() {
    assert!(LinearScale::new(3.0, 3.0).is_err());
    assert!(LinearScale::new(0.0, f64::INFINITY).is_err());
    let scale = LinearScale::new(0.0, 1.0)
        .expect("valid scale")
        .with_range(5.0, 5.0);
    assert!(scale.invert(5.0).is_err());
}

#[test]
fn covering_widens_collapsed_extents() {
    assert_eq!(
        LinearScale::covering(4.0, 4.0).expect("scale").domain(),
        (0.0, 4.0)
    );
    assert_eq!(
        LinearScale::covering(-2.0, -2.0).expect("scale").domain(),
        (-2.0, 0.0)
    );
    assert_eq!(
        LinearScale::covering(0.0, 0.0).expect("scale").domain(),
        (0.0, 1.0)
    );
    assert_eq!(
        LinearScale::covering(9.0, 1.0).expect("scale").domain(),
        (1.0, 9.0)
    );
}

#[test]
fn nice_extends_domain_to_round_values() {
    let scale = LinearScale::new(0.3, 97.2).expect("valid scale").nice(5);
    assert_eq!(scale.domain(), (0.0, 100.0));
    assert_eq!(scale.ticks(5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
}

#[test]
fn nice_step_rounds_to_one_two_five() {
    assert_relative_eq!(nice_step(0.013), 0.01, epsilon = 1e-12);
    assert_relative_eq!(nice_step(17.0), 20.0);
    assert_relative_eq!(nice_step(40.0), 50.0);
    assert_relative_eq!(nice_step(80.0), 100.0);
    assert_eq!(nice_step(0.0), 0.0);
    assert_eq!(nice_step(f64::NAN), 0.0);
}

#[test]
fn nice_ticks_snap_to_the_step_grid() {
    let ticks = nice_ticks(0.0, 1.0, 10);
    assert_eq!(ticks.len(), 11);
    assert_relative_eq!(ticks[3], 0.3, epsilon = 1e-12);
    assert!(
        ticks
            .iter()
            .all(|tick| (tick * 10.0 - (tick * 10.0).round()).abs() < 1e-9)
    );
    assert_eq!(nice_ticks(5.0, 5.0, 4), vec![5.0]);
    assert!(nice_ticks(0.0, 1.0, 0).is_empty());
}

#[test]
fn tick_target_count_tracks_axis_length() {
    assert_eq!(tick_target_count(400.0, 80.0, 2, 10), 6);
    assert_eq!(tick_target_count(10.0, 80.0, 2, 10), 2);
    assert_eq!(tick_target_count(5_000.0, 80.0, 2, 10), 10);
    assert_eq!(tick_target_count(f64::NAN, 80.0, 2, 10), 2);
}

#[test]
fn band_scale_divides_range_evenly() {
    let bands = BandScale::new(0.0, 100.0, 4).with_padding(0.0, 0.0);
    assert_relative_eq!(bands.step(), 25.0);
    assert_relative_eq!(bands.band_width(), 25.0);
    assert_relative_eq!(bands.start(0), 0.0);
    assert_relative_eq!(bands.center(3), 87.5);

    let padded = BandScale::new(0.0, 100.0, 4).with_padding(0.2, 0.1);
    assert!(padded.band_width() < padded.step());
    assert!(padded.start(0) > 0.0);
    assert!(padded.start(3) + padded.band_width() < 100.0);
    assert_eq!(BandScale::new(0.0, 100.0, 0).band_width(), 0.0);
}

#[test]
fn sqrt_scale_is_area_true() {
    let scale = SqrtScale::new(100.0, 50.0).expect("valid scale");
    assert_relative_eq!(scale.map(100.0), 50.0);
    assert_relative_eq!(scale.map(25.0), 25.0);
    assert_eq!(scale.map(-4.0), 0.0);
    assert!(SqrtScale::new(0.0, 10.0).is_err());
}

#[test]
fn temporal_ticks_align_to_calendar_boundaries() {
    let start = parse_temporal("2024-01-15").expect("date");
    let end = parse_temporal("2024-12-20").expect("date");
    let ticks = temporal_ticks(start, end, 6);

    assert!(!ticks.is_empty());
    assert!(ticks.len() <= 6);
    assert!(ticks.iter().all(|tick| tick.position >= start && tick.position <= end));
    assert!(ticks.windows(2).all(|pair| pair[0].position < pair[1].position));
    assert_eq!(ticks[0].label, "Apr 2024");
}

#[test]
fn temporal_ticks_switch_to_years_for_long_spans() {
    let start = parse_temporal("2001-06-01").expect("date");
    let end = parse_temporal("2023-06-01").expect("date");
    let ticks = temporal_ticks(start, end, 6);

    assert!(!ticks.is_empty());
    assert!(ticks.iter().all(|tick| tick.label.len() == 4));
}

proptest! {
    #[test]
    fn invert_undoes_map(
        lo in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        value in -1.0e6f64..1.0e6,
    ) {
        let scale = LinearScale::new(lo, lo + span)
            .expect("valid scale")
            .with_range(20.0, 620.0);
        let back = scale.invert(scale.map(value)).expect("invert");
        prop_assert!((back - value).abs() <= 1e-6 * (1.0 + value.abs() + lo.abs() + span));
    }

    #[test]
    fn nice_domain_covers_the_data(lo in -1.0e5f64..1.0e5, span in 1.0e-2f64..1.0e5, count in 2usize..10) {
        let nice = LinearScale::new(lo, lo + span).expect("valid scale").nice(count);
        let (start, end) = nice.domain();
        prop_assert!(start <= lo);
        prop_assert!(end >= lo + span);
        let ticks = nice.ticks(count);
        prop_assert!(!ticks.is_empty());
        prop_assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
