use chart_templates::TemplateKind;
use chart_templates::api::{
    ChartEngine, ChartEngineConfig, ChartPayload, ColumnRole, ColumnSpec, Row,
};
use chart_templates::core::{LinearScale, nice_ticks};
use chart_templates::layout::{
    CirclePackingConfig, LabelPlacementConfig, PointLabel, TrianglePackingConfig, pack_circles,
    pack_triangles, place_point_labels,
};
use chart_templates::render::NullRenderer;
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

fn bench_linear_scale_map(c: &mut Criterion) {
    let scale = LinearScale::new(0.0, 10_000.0)
        .expect("valid scale")
        .nice(8)
        .with_range(0.0, 1_920.0);

    c.bench_function("linear_scale_map_invert", |b| {
        b.iter(|| {
            let px = scale.map(black_box(4_321.123));
            let _ = scale.invert(px).expect("invertible");
        })
    });
    c.bench_function("nice_ticks", |b| {
        b.iter(|| nice_ticks(black_box(-13.7), black_box(982.4), black_box(8)))
    });
}

fn bench_circle_packing_200(c: &mut Criterion) {
    let radii: Vec<f64> = (0..200).map(|i| 1.0 + ((i * 37) % 23) as f64).collect();

    c.bench_function("circle_packing_200", |b| {
        b.iter(|| {
            pack_circles(black_box(&radii), CirclePackingConfig::default())
                .expect("packing should succeed")
        })
    });
}

fn bench_triangle_packing_100(c: &mut Criterion) {
    let areas: Vec<f64> = (0..100).map(|i| 10.0 + ((i * 53) % 97) as f64).collect();

    c.bench_function("triangle_packing_100", |b| {
        b.iter(|| {
            pack_triangles(black_box(&areas), TrianglePackingConfig::default())
                .expect("packing should succeed")
        })
    });
}

fn bench_label_placement_1k(c: &mut Criterion) {
    let points: Vec<(f64, f64)> = (0..1_000)
        .map(|i| {
            let x = i as f64 * 2.0;
            (x, 200.0 + 80.0 * (x / 40.0).sin())
        })
        .collect();
    let labels: Vec<PointLabel> = points
        .iter()
        .map(|&anchor| PointLabel::new(anchor, 28.0, 12.0))
        .collect();

    c.bench_function("label_placement_1k", |b| {
        b.iter(|| {
            place_point_labels(
                black_box(&labels),
                black_box(&points),
                LabelPlacementConfig::default(),
            )
            .expect("placement should succeed")
        })
    });
}

fn bench_line_template_2k(c: &mut Criterion) {
    let rows: Vec<Row> = (0..2_000)
        .map(|i| {
            let mut row = Row::new();
            row.insert("t".to_owned(), json!(i));
            row.insert("v".to_owned(), json!((i as f64 / 25.0).sin() * 100.0));
            row.insert("s".to_owned(), json!(if i % 2 == 0 { "a" } else { "b" }));
            row
        })
        .collect();
    let payload = ChartPayload::new(
        vec![
            ColumnSpec::new(ColumnRole::X, "t"),
            ColumnSpec::new(ColumnRole::Y, "v"),
            ColumnSpec::new(ColumnRole::Group, "s"),
        ],
        rows,
    );
    let engine = ChartEngine::new(NullRenderer::default(), ChartEngineConfig::default())
        .expect("engine init");

    c.bench_function("line_template_frame_2k", |b| {
        b.iter(|| {
            engine
                .build_frame(TemplateKind::Line, black_box(&payload))
                .expect("frame should build")
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_map,
    bench_circle_packing_200,
    bench_triangle_packing_100,
    bench_label_placement_1k,
    bench_line_template_2k
);
criterion_main!(benches);
