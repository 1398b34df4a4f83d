use chart_templates::api::{
    CHART_REQUEST_JSON_SCHEMA_V1, ChartContainer, ChartEngine, ChartEngineConfig, ChartPayload,
    ChartRequestJsonContractV1, ColumnRole, ColumnSpec, Row, Variables,
};
use chart_templates::render::{LineStrokeStyle, SvgRenderer};
use chart_templates::{ChartError, TemplateKind, make_chart, make_chart_from_json};
use serde_json::json;

fn sales_payload() -> ChartPayload {
    let rows: Vec<Row> = [("North", 120.0), ("South", 80.5), ("West", 42.0)]
        .into_iter()
        .map(|(region, sales)| {
            let mut row = Row::new();
            row.insert("region".to_owned(), json!(region));
            row.insert("sales".to_owned(), json!(sales));
            row
        })
        .collect();
    ChartPayload::new(
        vec![
            ColumnSpec::new(ColumnRole::Label, "region"),
            ColumnSpec::new(ColumnRole::Value, "sales").with_unit("$"),
        ],
        rows,
    )
    .with_variables(Variables::new().with("title", "Sales <by region>"))
}

#[test]
fn make_chart_fills_the_container_with_svg() {
    let mut container = ChartContainer::new("#chart");
    let chart = make_chart(&mut container, TemplateKind::Bar, &sales_payload())
        .expect("chart should be drawn");

    assert!(container.content().starts_with("<svg"));
    assert!(container.content().contains(r#"class="chart chart-bar""#));
    assert_eq!(container.content(), chart.svg);
    assert!(!container.has_error());
    assert_eq!(container.selector(), "#chart");
    assert_eq!(chart.frame.rects().count(), 3);
}

#[test]
fn svg_output_escapes_text_and_groups_layers() {
    let mut container = ChartContainer::new("#chart");
    make_chart(&mut container, TemplateKind::Bar, &sales_payload()).expect("chart");
    let svg = container.content();

    assert!(svg.contains("Sales &lt;by region&gt;"));
    assert!(svg.contains(r#"<g class="layer-marks">"#));
    assert!(svg.contains("$120"));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn root_class_uses_dashed_template_names() {
    let mut engine = ChartEngine::<SvgRenderer>::svg().expect("engine init");
    let svg = engine
        .render_svg(TemplateKind::GroupedColumn, &grouped_payload())
        .expect("svg");
    assert!(svg.contains(r#"class="chart chart-grouped-column""#));
}

fn grouped_payload() -> ChartPayload {
    ChartPayload::from_json_value(json!({
        "data": {
            "columns": [
                { "role": "label", "name": "q" },
                { "role": "group", "name": "g" },
                { "role": "value", "name": "v" }
            ],
            "data": [
                { "q": "Q1", "g": "a", "v": 1 },
                { "q": "Q1", "g": "b", "v": 2 }
            ]
        }
    }))
    .expect("payload")
}

#[test]
fn failed_chart_shows_an_error_div_and_returns_none() {
    let mut container = ChartContainer::new("#broken");
    let payload = ChartPayload::new(vec![ColumnSpec::new(ColumnRole::Label, "region")], vec![]);

    let chart = make_chart(&mut container, TemplateKind::Pie, &payload);

    assert!(chart.is_none());
    assert!(container.has_error());
    assert!(container.content().contains(r#"role="alert""#));
    assert!(container.content().contains("pie: missing required column with role `value`"));
}

#[test]
fn error_replaces_a_previous_chart() {
    let mut engine = ChartEngine::<SvgRenderer>::svg().expect("engine init");
    let mut container = ChartContainer::new("#chart");
    assert!(
        engine
            .make_chart(&mut container, TemplateKind::Column, &sales_payload())
            .is_some()
    );
    assert!(!container.has_error());

    let empty = ChartPayload::new(sales_payload().columns().to_vec(), vec![]);
    assert!(
        engine
            .make_chart(&mut container, TemplateKind::Column, &empty)
            .is_none()
    );
    assert!(container.has_error());
    assert!(!container.content().contains("<svg"));

    container.clear();
    assert_eq!(container.content(), "");
}

#[test]
fn bad_json_is_reported_in_the_container() {
    let mut container = ChartContainer::new("#chart");
    assert!(make_chart_from_json(&mut container, TemplateKind::Bar, "{ not json").is_none());
    assert!(container.has_error());
    assert!(container.content().contains("invalid chart payload"));
}

#[test]
fn json_payload_renders_through_the_container() {
    let json = r##"{
        "data": {
            "columns": [
                { "role": "label", "name": "fruit" },
                { "role": "value", "name": "kg", "unit": "kg" }
            ],
            "data": [
                { "fruit": "apple", "kg": "1,250" },
                { "fruit": "pear", "kg": 300 }
            ]
        },
        "variables": { "decimals": 1 },
        "colors": { "available_colors": ["#336699", "#993366"] }
    }"##;
    let mut container = ChartContainer::new("#chart");
    let chart = make_chart_from_json(&mut container, TemplateKind::Column, json)
        .expect("chart should be drawn");

    assert!(chart.frame.contains_text("1,250.0 kg"));
    assert!(container.content().contains("#336699"));
}

#[test]
fn request_envelope_round_trips() {
    let request = ChartRequestJsonContractV1::new(TemplateKind::Heatmap, sales_payload());
    let text = request.to_json_pretty().expect("serialize");
    assert!(text.contains(r#""template": "heatmap""#));

    let parsed = ChartRequestJsonContractV1::from_json_str(&text).expect("parse");
    assert_eq!(parsed.schema_version, CHART_REQUEST_JSON_SCHEMA_V1);
    assert_eq!(parsed, request);

    let (kind, payload) = ChartPayload::from_json_compat_str(&text).expect("compat");
    assert_eq!(kind, Some(TemplateKind::Heatmap));
    assert_eq!(payload, sales_payload());
}

#[test]
fn compat_parsing_accepts_bare_payloads() {
    let bare = sales_payload().to_json_pretty().expect("serialize");
    let (kind, payload) = ChartPayload::from_json_compat_str(&bare).expect("compat");
    assert_eq!(kind, None);
    assert_eq!(payload.rows().len(), 3);
    assert_eq!(
        payload.column(ColumnRole::Value).and_then(|c| c.unit()),
        Some("$")
    );
}

#[test]
fn unsupported_envelope_versions_are_rejected() {
    let text = json!({
        "schema_version": 99,
        "template": "bar",
        "payload": {}
    })
    .to_string();
    assert!(matches!(
        ChartRequestJsonContractV1::from_json_str(&text),
        Err(ChartError::InvalidData(_))
    ));
}

#[test]
fn unknown_roles_and_sections_are_tolerated() {
    let payload = ChartPayload::from_json_str(
        r#"{
            "data": {
                "columns": [
                    { "role": "label", "name": "n" },
                    { "role": "value", "name": "v" },
                    { "role": "tooltip", "name": "t" }
                ],
                "data": [{ "n": "a", "v": 1, "t": "x" }]
            }
        }"#,
    )
    .expect("payload");
    assert_eq!(payload.columns()[2].role, ColumnRole::Unknown);
    assert!(payload.variables.get("title").is_none());

    let mut container = ChartContainer::new("#chart");
    assert!(make_chart(&mut container, TemplateKind::Lollipop, &payload).is_some());
}

#[test]
fn engine_config_is_validated() {
    let bad_palette = ChartEngineConfig::default().with_palette(Vec::<String>::new());
    assert!(ChartEngine::new(SvgRenderer::new(), bad_palette).is_err());

    let bad_color = ChartEngineConfig::default().with_text_color("not a color");
    assert!(matches!(
        ChartEngine::new(SvgRenderer::new(), bad_color),
        Err(ChartError::InvalidColor(_))
    ));

    let sized = ChartEngineConfig::default().with_size(320.0, 200.0);
    let mut engine = ChartEngine::new(SvgRenderer::new(), sized).expect("engine init");
    let frame = engine
        .render(TemplateKind::Bar, &sales_payload())
        .expect("render");
    assert_eq!((frame.viewport.width, frame.viewport.height), (320, 200));
    assert_eq!(engine.renderer().last_stats().rects_drawn, 3);
}

#[test]
fn variables_read_loose_values() {
    let vars = Variables::new()
        .with("show_values", "no")
        .with("bar_padding", "0.3")
        .with("decimals", 2)
        .with("empty", "  ")
        .with("nothing", serde_json::Value::Null);

    assert_eq!(vars.flag("show_values"), Some(false));
    assert!(vars.flag_or("missing", true));
    assert_eq!(vars.number("bar_padding"), Some(0.3));
    assert_eq!(vars.decimals(), Some(2));
    assert_eq!(vars.text("empty"), None);
    assert!(vars.get("nothing").is_none());
}

#[test]
fn failures_before_rendering_use_the_same_error_div() {
    let mut container = ChartContainer::new("#chart");
    make_chart(&mut container, TemplateKind::Bar, &sales_payload()).expect("chart");

    let err: ChartError = "radar".parse::<TemplateKind>().expect_err("unknown template");
    container.report_failure("radar", &err);
    assert!(container.has_error());
    assert!(container.content().contains("radar"));
    assert!(!container.content().contains("<svg"));
}

#[test]
fn dashed_gridlines_reach_the_svg() {
    assert_eq!(LineStrokeStyle::from_name(" dashed "), Some(LineStrokeStyle::Dashed));
    assert_eq!(LineStrokeStyle::from_name("wavy"), None);

    let mut engine = ChartEngine::<SvgRenderer>::svg().expect("engine init");
    let plain = engine
        .render_svg(TemplateKind::Bar, &sales_payload())
        .expect("svg");
    assert!(!plain.contains("stroke-dasharray"));

    let mut payload = sales_payload();
    payload.variables.insert("gridline_style", "dashed");
    let dashed = engine.render_svg(TemplateKind::Bar, &payload).expect("svg");
    assert!(dashed.contains(r#"stroke-dasharray="4 3""#));
}
