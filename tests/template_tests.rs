use chart_templates::api::{ChartEngine, ChartEngineConfig, ChartPayload, ColumnRole};
use chart_templates::core::DEFAULT_PALETTE;
use chart_templates::render::{LayerKind, LineStrokeStyle, NullRenderer, RenderFrame};
use chart_templates::templates::ChartTemplate;
use chart_templates::{ChartError, TemplateKind};
use serde_json::{Value, json};

fn payload(columns: Value, rows: Value, variables: Value) -> ChartPayload {
    ChartPayload::from_json_value(json!({
        "data": { "columns": columns, "data": rows },
        "variables": variables,
    }))
    .expect("payload should deserialize")
}

fn render(kind: TemplateKind, payload: &ChartPayload) -> RenderFrame {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartEngineConfig::default())
        .expect("engine init");
    let frame = engine.render(kind, payload).expect("chart should render");
    assert_eq!(engine.renderer().frames_rendered, 1);
    assert_eq!(engine.renderer().last_primitive_count, frame.primitive_count());
    frame
}

fn build_err(kind: TemplateKind, payload: &ChartPayload) -> ChartError {
    let engine = ChartEngine::new(NullRenderer::default(), ChartEngineConfig::default())
        .expect("engine init");
    engine
        .build_frame(kind, payload)
        .expect_err("chart should be rejected")
}

fn any_text_contains(frame: &RenderFrame, needle: &str) -> bool {
    frame.texts().any(|text| text.text.contains(needle))
}

fn label_value_payload(values: Value) -> ChartPayload {
    let rows: Vec<Value> = values
        .as_array()
        .expect("array of [label, value] pairs")
        .iter()
        .map(|pair| json!({ "name": pair[0], "amount": pair[1] }))
        .collect();
    payload(
        json!([
            { "role": "label", "name": "name" },
            { "role": "value", "name": "amount" },
        ]),
        Value::Array(rows),
        json!({}),
    )
}

#[test]
fn bar_draws_one_rect_per_usable_row() {
    let payload = label_value_payload(json!([["North", 1200], ["South", 800], ["East", "n/a"]]));
    let frame = render(TemplateKind::Bar, &payload);

    assert_eq!(frame.rects_in(LayerKind::Marks).count(), 2);
    assert!(frame.contains_text("North"));
    assert!(frame.contains_text("1,200"));
    assert!(!frame.contains_text("East"));
}

#[test]
fn bar_lengths_follow_values() {
    let payload = label_value_payload(json!([["a", 10], ["b", 40]]));
    let frame = render(TemplateKind::Bar, &payload);
    let widths: Vec<f64> = frame
        .rects_in(LayerKind::Marks)
        .map(|rect| rect.width)
        .collect();
    assert!((widths[1] / widths[0] - 4.0).abs() < 1e-6);
}

#[test]
fn column_draws_one_rect_per_row() {
    let payload = label_value_payload(json!([["Q1", 5], ["Q2", -3], ["Q3", 8], ["Q4", 2]]));
    let frame = render(TemplateKind::Column, &payload);

    assert_eq!(frame.rects_in(LayerKind::Marks).count(), 4);
    assert!(frame.rects().all(|rect| rect.width >= 0.0 && rect.height >= 0.0));
}

#[test]
fn grouped_column_draws_label_by_group_grid_with_legend() {
    let payload = payload(
        json!([
            { "role": "label", "name": "year" },
            { "role": "group", "name": "channel" },
            { "role": "value", "name": "sales" },
        ]),
        json!([
            { "year": "2022", "channel": "Online", "sales": 10 },
            { "year": "2022", "channel": "Retail", "sales": 12 },
            { "year": "2022", "channel": "Partner", "sales": 3 },
            { "year": "2023", "channel": "Online", "sales": 14 },
            { "year": "2023", "channel": "Retail", "sales": 9 },
            { "year": "2023", "channel": "Partner", "sales": 4 },
            { "year": "2023", "channel": "Partner", "sales": 400 },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::GroupedColumn, &payload);

    assert_eq!(frame.rects_in(LayerKind::Marks).count(), 6);
    for group in ["Online", "Retail", "Partner"] {
        assert!(any_text_contains(&frame, group), "legend is missing {group}");
    }
}

#[test]
fn stacked_bar_draws_one_segment_per_cell() {
    let payload = payload(
        json!([
            { "role": "label", "name": "team" },
            { "role": "group", "name": "status" },
            { "role": "value", "name": "count" },
        ]),
        json!([
            { "team": "A", "status": "open", "count": 3 },
            { "team": "A", "status": "closed", "count": 7 },
            { "team": "B", "status": "open", "count": 5 },
            { "team": "B", "status": "closed", "count": 1 },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::StackedBar, &payload);
    assert_eq!(frame.rects_in(LayerKind::Marks).count(), 4);
}

#[test]
fn scatter_draws_one_circle_per_point() {
    let payload = payload(
        json!([
            { "role": "x", "name": "gdp" },
            { "role": "y", "name": "life" },
            { "role": "size", "name": "pop" },
            { "role": "label", "name": "country" },
        ]),
        json!([
            { "gdp": 1, "life": 60, "pop": 10, "country": "A" },
            { "gdp": 2, "life": 65, "pop": 40, "country": "B" },
            { "gdp": 3, "life": 70, "pop": 90, "country": "C" },
            { "gdp": 4, "life": 72, "pop": 5, "country": "D" },
            { "gdp": 5, "life": 80, "pop": 20, "country": "E" },
        ]),
        json!({ "show_labels": true }),
    );
    let frame = render(TemplateKind::Scatter, &payload);

    let radii: Vec<f64> = frame
        .circles_in(LayerKind::Marks)
        .map(|circle| circle.radius)
        .collect();
    assert_eq!(radii.len(), 5);
    // Area-true sizing: the largest population gets the largest circle.
    assert!(radii[2] > radii[1] && radii[1] > radii[0]);
    assert!(frame.contains_text("C"));
}

fn series_payload(with_groups: bool) -> ChartPayload {
    let mut columns = vec![
        json!({ "role": "x", "name": "day" }),
        json!({ "role": "y", "name": "value" }),
    ];
    if with_groups {
        columns.push(json!({ "role": "group", "name": "city" }));
    }
    let mut rows = Vec::new();
    for (i, day) in ["2024-01-01", "2024-01-02", "2024-01-03"].iter().enumerate() {
        for (city, offset) in [("Oslo", 0.0), ("Rome", 10.0)] {
            rows.push(json!({ "day": day, "value": i as f64 + offset, "city": city }));
        }
    }
    if !with_groups {
        rows.retain(|row| row["city"] == "Oslo");
    }
    payload(Value::Array(columns), Value::Array(rows), json!({}))
}

#[test]
fn line_draws_a_path_per_series_with_end_labels() {
    let frame = render(TemplateKind::Line, &series_payload(true));

    assert_eq!(frame.paths_in(LayerKind::Marks).count(), 2);
    assert!(frame.contains_text("Oslo"));
    assert!(frame.contains_text("Rome"));
}

#[test]
fn ungrouped_line_is_a_single_path() {
    let frame = render(TemplateKind::Line, &series_payload(false));
    assert_eq!(frame.paths_in(LayerKind::Marks).count(), 1);
    assert_eq!(frame.circles_in(LayerKind::Marks).count(), 0);
}

#[test]
fn line_data_labels_are_placed_or_hidden() {
    let mut payload = series_payload(false);
    payload.variables.insert("show_data_labels", true);
    let frame = render(TemplateKind::Line, &payload);

    let labels = frame.texts_in(LayerKind::Labels).count();
    assert!((1..=3).contains(&labels));
}

#[test]
fn line_needs_two_points() {
    let payload = payload(
        json!([{ "role": "x", "name": "x" }, { "role": "y", "name": "y" }]),
        json!([{ "x": 1, "y": 2 }]),
        json!({}),
    );
    assert!(matches!(
        build_err(TemplateKind::Line, &payload),
        ChartError::InsufficientData {
            template: "line",
            required: 2,
            found: 1
        }
    ));
}

#[test]
fn area_draws_fill_and_outline_per_series() {
    let frame = render(TemplateKind::Area, &series_payload(true));
    assert_eq!(frame.paths_in(LayerKind::Marks).count(), 4);
}

#[test]
fn pie_skips_non_positive_slices() {
    let payload = label_value_payload(json!([["A", 3], ["B", 2], ["C", 0], ["D", -1], ["E", 5]]));
    let frame = render(TemplateKind::Pie, &payload);

    assert_eq!(frame.paths_in(LayerKind::Marks).count(), 3);
    assert!(frame.contains_text("A"));
    assert!(!frame.contains_text("D"));
}

#[test]
fn donut_single_slice_is_a_full_ring() {
    let mut payload = label_value_payload(json!([["All", 7]]));
    payload.variables.insert("inner_radius_ratio", 0.5);
    let frame = render(TemplateKind::Pie, &payload);
    assert_eq!(frame.paths_in(LayerKind::Marks).count(), 1);
    assert!(frame.contains_text("100%"));
}

#[test]
fn pie_without_positive_values_is_rejected() {
    let payload = label_value_payload(json!([["A", 0], ["B", -2]]));
    assert!(matches!(
        build_err(TemplateKind::Pie, &payload),
        ChartError::InsufficientData { found: 0, .. }
    ));
}

#[test]
fn proportional_circles_do_not_overlap() {
    let payload = label_value_payload(json!([["a", 100], ["b", 50], ["c", 25], ["d", 10]]));
    let frame = render(TemplateKind::ProportionalCircles, &payload);

    let circles: Vec<_> = frame.circles_in(LayerKind::Marks).collect();
    assert_eq!(circles.len(), 4);
    for (i, a) in circles.iter().enumerate() {
        assert!(a.cx - a.radius >= -1e-6 && a.cx + a.radius <= 640.0 + 1e-6);
        for b in &circles[i + 1..] {
            let distance = (a.cx - b.cx).hypot(a.cy - b.cy);
            assert!(distance >= a.radius + b.radius - 1e-3);
        }
    }
    // Radii follow the square root of the values.
    let ratio = circles[0].radius / circles[2].radius;
    assert!((ratio - 2.0).abs() < 1e-6);
}

#[test]
fn proportional_triangles_draw_one_polygon_each() {
    let payload = label_value_payload(json!([["a", 9], ["b", 4], ["c", 1]]));
    let frame = render(TemplateKind::ProportionalTriangles, &payload);
    assert_eq!(frame.paths_in(LayerKind::Marks).count(), 3);
}

#[test]
fn dot_plot_draws_dots_and_range_lines() {
    let payload = payload(
        json!([
            { "role": "label", "name": "country" },
            { "role": "value", "name": "score" },
            { "role": "group", "name": "year" },
        ]),
        json!([
            { "country": "A", "score": 10, "year": "2010" },
            { "country": "A", "score": 20, "year": "2020" },
            { "country": "B", "score": 15, "year": "2010" },
            { "country": "B", "score": 12, "year": "2020" },
            { "country": "C", "score": 30, "year": "2010" },
            { "country": "C", "score": 30, "year": "2020" },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::DotPlot, &payload);

    assert_eq!(frame.circles_in(LayerKind::Marks).count(), 6);
    // C has no spread, so only A and B get a range line.
    assert_eq!(frame.lines_in(LayerKind::Marks).count(), 2);
}

#[test]
fn slope_draws_a_line_and_two_dots_per_row() {
    let payload = payload(
        json!([
            { "role": "label", "name": "party" },
            { "role": "start", "name": "2019" },
            { "role": "end", "name": "2023" },
        ]),
        json!([
            { "party": "Alpha", "2019": 30, "2023": 25 },
            { "party": "Beta", "2019": 20, "2023": 28 },
            { "party": "Gamma", "2019": 10, "2023": 11 },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::Slope, &payload);

    assert_eq!(frame.lines_in(LayerKind::Marks).count(), 3);
    assert_eq!(frame.circles_in(LayerKind::Marks).count(), 6);
    assert!(any_text_contains(&frame, "Alpha"));
    assert!(frame.contains_text("2019"));
}

#[test]
fn lollipop_draws_stem_and_head_per_row() {
    let payload = label_value_payload(json!([["a", 4], ["b", -2], ["c", 9], ["d", 0]]));
    let frame = render(TemplateKind::Lollipop, &payload);

    assert_eq!(frame.circles_in(LayerKind::Marks).count(), 4);
    // A zero value has no stem.
    assert_eq!(frame.lines_in(LayerKind::Marks).count(), 3);
}

#[test]
fn heatmap_fills_one_cell_per_pair() {
    let payload = payload(
        json!([
            { "role": "x", "name": "day" },
            { "role": "y", "name": "slot" },
            { "role": "value", "name": "visits" },
        ]),
        json!([
            { "day": "Mon", "slot": "AM", "visits": 1 },
            { "day": "Mon", "slot": "PM", "visits": 5 },
            { "day": "Mon", "slot": "Eve", "visits": 2 },
            { "day": "Tue", "slot": "AM", "visits": 7 },
            { "day": "Tue", "slot": "PM", "visits": 3 },
            { "day": "Tue", "slot": "Eve", "visits": 9 },
            { "day": "Tue", "slot": "Eve", "visits": 100 },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::Heatmap, &payload);

    assert_eq!(frame.rects_in(LayerKind::Marks).count(), 6);
    assert!(frame.contains_text("9"));
    assert!(!frame.contains_text("100"));
}

#[test]
fn every_template_reports_its_missing_roles() {
    let empty_columns = payload(json!([]), json!([{ "a": 1 }]), json!({}));
    for kind in TemplateKind::ALL {
        match build_err(kind, &empty_columns) {
            ChartError::MissingRole { template, role } => {
                assert_eq!(template, kind.name());
                assert!(kind.template().required_roles().contains(&role));
            }
            other => panic!("{kind}: expected a missing role, got {other:?}"),
        }
    }
}

#[test]
fn bar_names_the_missing_value_role() {
    let payload = payload(
        json!([{ "role": "label", "name": "name" }]),
        json!([{ "name": "a" }]),
        json!({}),
    );
    assert!(matches!(
        build_err(TemplateKind::Bar, &payload),
        ChartError::MissingRole {
            template: "bar",
            role: ColumnRole::Value
        }
    ));
}

#[test]
fn empty_data_is_insufficient() {
    let payload = label_value_payload(json!([]));
    assert!(matches!(
        build_err(TemplateKind::Column, &payload),
        ChartError::InsufficientData {
            template: "column",
            found: 0,
            ..
        }
    ));
}

#[test]
fn template_names_parse_loosely() {
    assert_eq!(
        "Grouped-Column".parse::<TemplateKind>().expect("known template"),
        TemplateKind::GroupedColumn
    );
    for kind in TemplateKind::ALL {
        assert_eq!(kind.name().parse::<TemplateKind>().expect("round trip"), kind);
        assert_eq!(kind.template().kind(), kind);
    }
    assert!(matches!(
        "radar".parse::<TemplateKind>(),
        Err(ChartError::UnknownTemplate(name)) if name == "radar"
    ));
}

#[test]
fn header_and_viewport_come_from_variables() {
    let mut payload = label_value_payload(json!([["a", 1], ["b", 2]]));
    payload.variables.insert("title", "Quarterly sales");
    payload.variables.insert("subtitle", "In thousands");
    payload.variables.insert("source", "Source: ledger");
    payload.variables.insert("width", 900);
    payload.variables.insert("height", "300");
    let frame = render(TemplateKind::Bar, &payload);

    assert_eq!((frame.viewport.width, frame.viewport.height), (900, 300));
    assert!(frame.contains_text("Quarterly sales"));
    assert!(frame.contains_text("In thousands"));
    assert!(frame.contains_text("Source: ledger"));
}

#[test]
fn invalid_dimensions_and_colors_are_errors() {
    let mut payload = label_value_payload(json!([["a", 1]]));
    payload.variables.insert("width", 0);
    assert!(matches!(
        build_err(TemplateKind::Bar, &payload),
        ChartError::InvalidViewport { width: 0, .. }
    ));

    let mut payload = label_value_payload(json!([["a", 1]]));
    payload.colors.available_colors = vec!["#zzzzzz".to_owned()];
    assert!(matches!(
        build_err(TemplateKind::Bar, &payload),
        ChartError::InvalidColor(_)
    ));
}

#[test]
fn payload_palette_colors_the_marks() {
    let mut payload = label_value_payload(json!([["a", 1], ["b", 2]]));
    payload.colors.available_colors = vec!["#ff0000".to_owned(), "#0000ff".to_owned()];
    let frame = render(TemplateKind::Column, &payload);

    let fills: Vec<String> = frame
        .rects_in(LayerKind::Marks)
        .map(|rect| rect.fill_color.to_hex())
        .collect();
    assert_eq!(fills, vec!["#ff0000", "#0000ff"]);
}

fn team_status_payload(rows: Value, variables: Value) -> ChartPayload {
    payload(
        json!([
            { "role": "label", "name": "team" },
            { "role": "group", "name": "status" },
            { "role": "value", "name": "count" },
        ]),
        rows,
        variables,
    )
}

#[test]
fn normalized_stacks_fill_the_same_width() {
    let payload = team_status_payload(
        json!([
            { "team": "A", "status": "open", "count": 3 },
            { "team": "A", "status": "closed", "count": 7 },
            { "team": "B", "status": "open", "count": 5 },
            { "team": "B", "status": "closed", "count": 1 },
        ]),
        json!({ "normalize": true }),
    );
    let frame = render(TemplateKind::StackedBar, &payload);
    let widths: Vec<f64> = frame
        .rects_in(LayerKind::Marks)
        .map(|rect| rect.width)
        .collect();
    assert_eq!(widths.len(), 4);

    let (a_total, b_total) = (widths[0] + widths[1], widths[2] + widths[3]);
    assert!((a_total - b_total).abs() < 1e-6);
    assert!((widths[0] / a_total - 0.3).abs() < 1e-6);
    assert!((widths[2] / b_total - 5.0 / 6.0).abs() < 1e-6);
}

#[test]
fn negative_segments_stack_left_of_zero() {
    let payload = team_status_payload(
        json!([
            { "team": "A", "status": "gain", "count": 4 },
            { "team": "A", "status": "loss", "count": -2 },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::StackedBar, &payload);
    let rects: Vec<_> = frame.rects_in(LayerKind::Marks).collect();
    assert_eq!(rects.len(), 2);

    let (gain, loss) = (rects[0], rects[1]);
    assert!(loss.x < gain.x);
    assert!((loss.x + loss.width - gain.x).abs() < 1e-6);
    assert!((gain.width / loss.width - 2.0).abs() < 1e-6);
}

#[test]
fn color_field_overrides_the_default_key() {
    let payload = ChartPayload::from_json_value(json!({
        "data": {
            "columns": [
                { "role": "label", "name": "store" },
                { "role": "value", "name": "sales" },
                { "role": "unknown", "name": "region" },
            ],
            "data": [
                { "store": "a", "sales": 1, "region": "North" },
                { "store": "b", "sales": 2, "region": "South" },
                { "store": "c", "sales": 3, "region": "North" },
            ],
        },
        "colors": { "field": "region", "available_colors": ["#ff0000", "#0000ff"] },
    }))
    .expect("payload");
    let frame = render(TemplateKind::Bar, &payload);

    let fills: Vec<String> = frame
        .rects_in(LayerKind::Marks)
        .map(|rect| rect.fill_color.to_hex())
        .collect();
    assert_eq!(fills, vec!["#ff0000", "#0000ff", "#ff0000"]);
    assert!(any_text_contains(&frame, "North"));
    assert!(any_text_contains(&frame, "South"));
}

fn image_payload(columns: Value, rows: Value) -> ChartPayload {
    ChartPayload::from_json_value(json!({
        "data": { "columns": columns, "data": rows },
        "images": { "field": "photo" },
    }))
    .expect("payload")
}

#[test]
fn scatter_draws_an_image_per_row_with_a_url() {
    let payload = image_payload(
        json!([
            { "role": "x", "name": "x" },
            { "role": "y", "name": "y" },
        ]),
        json!([
            { "x": 1, "y": 2, "photo": "https://example.com/a.png" },
            { "x": 2, "y": 5, "photo": "https://example.com/b.png" },
            { "x": 3, "y": 1 },
        ]),
    );
    let frame = render(TemplateKind::Scatter, &payload);

    assert_eq!(frame.circles_in(LayerKind::Marks).count(), 3);
    let hrefs: Vec<&str> = frame.images().map(|image| image.href.as_str()).collect();
    assert_eq!(
        hrefs,
        vec!["https://example.com/a.png", "https://example.com/b.png"]
    );
}

#[test]
fn proportional_circles_draw_images_inside_circles() {
    let payload = image_payload(
        json!([
            { "role": "label", "name": "name" },
            { "role": "value", "name": "amount" },
        ]),
        json!([
            { "name": "a", "amount": 4, "photo": "a.png" },
            { "name": "b", "amount": 9, "photo": "b.png" },
        ]),
    );
    let frame = render(TemplateKind::ProportionalCircles, &payload);

    assert_eq!(frame.images().count(), 2);
    for (image, circle) in frame.images().zip(frame.circles_in(LayerKind::Marks)) {
        let (cx, cy) = (image.x + image.width / 2.0, image.y + image.height / 2.0);
        assert!((cx - circle.cx).hypot(cy - circle.cy) < 1e-6);
        assert!(image.width <= circle.radius * 2.0);
    }
}

#[test]
fn heatmap_ramps_between_the_first_two_default_colors() {
    let payload = payload(
        json!([
            { "role": "x", "name": "day" },
            { "role": "y", "name": "hour" },
            { "role": "value", "name": "v" },
        ]),
        json!([
            { "day": "Mon", "hour": "9", "v": 0 },
            { "day": "Tue", "hour": "9", "v": 10 },
        ]),
        json!({}),
    );
    let frame = render(TemplateKind::Heatmap, &payload);

    let fills: Vec<String> = frame
        .rects_in(LayerKind::Marks)
        .map(|rect| rect.fill_color.to_hex())
        .collect();
    assert_eq!(fills, vec![DEFAULT_PALETTE[0], DEFAULT_PALETTE[1]]);
}

#[test]
fn heatmap_with_one_color_ramps_from_white() {
    let mut payload = payload(
        json!([
            { "role": "x", "name": "day" },
            { "role": "y", "name": "hour" },
            { "role": "value", "name": "v" },
        ]),
        json!([
            { "day": "Mon", "hour": "9", "v": 0 },
            { "day": "Tue", "hour": "9", "v": 10 },
        ]),
        json!({}),
    );
    payload.colors.available_colors = vec!["#000000".to_owned()];
    let frame = render(TemplateKind::Heatmap, &payload);

    let fills: Vec<String> = frame
        .rects_in(LayerKind::Marks)
        .map(|rect| rect.fill_color.to_hex())
        .collect();
    assert_eq!(fills, vec!["#ffffff", "#000000"]);
}

#[test]
fn gridline_style_variable_sets_the_dash_pattern() {
    let solid = render(TemplateKind::Bar, &label_value_payload(json!([["a", 3], ["b", 8]])));
    assert!(solid.lines_in(LayerKind::Grid).count() > 0);
    assert!(
        solid
            .lines_in(LayerKind::Grid)
            .all(|line| line.stroke_style == LineStrokeStyle::Solid)
    );

    let mut payload = label_value_payload(json!([["a", 3], ["b", 8]]));
    payload.variables.insert("gridline_style", "Dotted");
    let dotted = render(TemplateKind::Bar, &payload);
    assert!(
        dotted
            .lines_in(LayerKind::Grid)
            .all(|line| line.stroke_style == LineStrokeStyle::Dotted)
    );
    // Axis lines keep a solid stroke.
    assert!(
        dotted
            .lines_in(LayerKind::Axis)
            .all(|line| line.stroke_style == LineStrokeStyle::Solid)
    );
}
