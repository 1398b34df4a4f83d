use indexmap::IndexMap;
use tracing::warn;

use crate::api::ColumnRole;
use crate::core::PlotArea;
use crate::error::ChartResult;
use crate::layout::{
    LabelPlacementConfig, PointLabel, StackedLabel, place_point_labels,
    resolve_vertical_collisions,
};
use crate::render::{
    CirclePrimitive, Color, LayerKind, PathPrimitive, RenderFrame, TextHAlign, TextPrimitive,
    TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, bottom_axis_height, display_text, domain_override,
    draw_bottom_axis, draw_left_axis, ensure_rows, extent, numeric_cell, parse_x_values,
    pick_color,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "line";
const END_LABEL_GAP: f64 = 2.0;

/// One polyline per series over a numeric or calendar x axis.
pub(super) struct LineTemplate;

/// Rows of one series, sorted by x.
pub(super) struct Series {
    pub name: String,
    pub color_key: Option<String>,
    pub points: Vec<(f64, f64)>,
}

pub(super) struct SeriesSet {
    pub series: Vec<Series>,
    pub temporal: bool,
    pub grouped: bool,
}

impl SeriesSet {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|series| series.points.len()).sum()
    }

    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))
    }
}

/// Splits rows into series by the `group` column, in first-appearance order.
pub(super) fn parse_series(ctx: &TemplateContext<'_>, template: &'static str) -> ChartResult<SeriesSet> {
    let x_column = ctx.require(template, ColumnRole::X)?;
    let y_column = ctx.require(template, ColumnRole::Y)?;
    let group_column = ctx.column(ColumnRole::Group);
    let color_column = ctx.color_column(&[ColumnRole::Group]);
    let x_values = parse_x_values(ctx.rows(), x_column);

    let mut series: IndexMap<String, Series> = IndexMap::new();
    for (i, row) in ctx.rows().iter().enumerate() {
        let Some(x) = x_values.values.get(i).copied().flatten() else {
            warn!(
                template,
                row = i,
                column = %x_column.name,
                "skipping row: x cell is missing or unparseable"
            );
            continue;
        };
        let Some(y) = numeric_cell(template, i, row, y_column) else {
            continue;
        };
        let name = group_column
            .map(|column| display_text(row, column))
            .unwrap_or_default();
        let color_key = color_column.as_ref().map(|column| display_text(row, column));
        series
            .entry(name.clone())
            .or_insert_with(|| Series {
                name,
                color_key,
                points: Vec::new(),
            })
            .points
            .push((x, y));
    }
    let mut series: Vec<Series> = series.into_values().collect();
    for entry in &mut series {
        entry.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    Ok(SeriesSet {
        series,
        temporal: x_values.temporal,
        grouped: group_column.is_some(),
    })
}

/// Axes shared by line-like charts.
pub(super) struct SeriesAxes {
    pub x: ValueAxis,
    pub y: ValueAxis,
    pub plot: PlotArea,
}

pub(super) fn series_axes(
    ctx: &TemplateContext<'_>,
    template: &'static str,
    set: &SeriesSet,
    plot: PlotArea,
    include_zero: bool,
) -> ChartResult<SeriesAxes> {
    let y_unit = ctx.column(ColumnRole::Y).and_then(|column| column.unit());
    let x_unit = ctx.column(ColumnRole::X).and_then(|column| column.unit());

    let (y_lo, y_hi) = set.y_extent().unwrap_or((0.0, 1.0));
    let (y_lo, y_hi) = if include_zero {
        (y_lo.min(0.0), y_hi.max(0.0))
    } else {
        (y_lo, y_hi)
    };
    let (y_lo, y_hi, y_fixed) = domain_override(ctx, "y", y_lo, y_hi);
    let y_probe = ValueAxis::numeric(y_lo, y_hi, plot.height, y_unit, !y_fixed)?;
    let plot = plot
        .trim_left(y_probe.label_width(ctx) + TICK_LABEL_GAP)
        .trim_bottom(bottom_axis_height(ctx))
        .ensure_usable(template)?;

    let (x_lo, x_hi) = set.x_extent().unwrap_or((0.0, 1.0));
    let x = if set.temporal {
        ValueAxis::temporal(x_lo, x_hi, plot.width)?
    } else {
        let (x_lo, x_hi, _) = domain_override(ctx, "x", x_lo, x_hi);
        ValueAxis::numeric(x_lo, x_hi, plot.width, x_unit, false)?
    };
    Ok(SeriesAxes {
        x: x.with_range(plot.x, plot.right()),
        y: y_probe.with_range(plot.bottom(), plot.y),
        plot,
    })
}

/// Series names stacked at the right edge next to each series' last point.
pub(super) fn draw_end_labels(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    entries: &[(String, f64, Color)],
    plot: PlotArea,
) {
    let font = &ctx.typography().label;
    let height = ctx.measurer.measure("0", font).height();
    let stacked: Vec<StackedLabel> = entries
        .iter()
        .map(|(_, y, _)| StackedLabel::new(*y, height))
        .collect();
    let positions = resolve_vertical_collisions(&stacked, plot.y, plot.bottom(), END_LABEL_GAP);
    for ((name, _, color), y) in entries.iter().zip(positions) {
        if name.is_empty() {
            continue;
        }
        frame.push(
            LayerKind::Labels,
            TextPrimitive::with_font(
                name.clone(),
                plot.right() + TICK_LABEL_GAP,
                y,
                font,
                *color,
                TextHAlign::Left,
            )
            .with_v_align(TextVAlign::Middle),
        );
    }
}

/// Right gutter wide enough for the series names, capped to a share of the plot.
pub(super) fn end_label_gutter(ctx: &TemplateContext<'_>, set: &SeriesSet, plot: PlotArea) -> f64 {
    if !set.grouped {
        return 0.0;
    }
    let font = &ctx.typography().label;
    let widest = set
        .series
        .iter()
        .map(|series| ctx.measurer.width(&series.name, font))
        .fold(0.0, f64::max);
    (widest + TICK_LABEL_GAP * 2.0).min(plot.width * 0.3)
}

impl ChartTemplate for LineTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Line
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::X, ColumnRole::Y]
    }

    fn min_rows(&self) -> usize {
        2
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let set = parse_series(ctx, NAME)?;
        ensure_rows(NAME, self.min_rows(), set.point_count())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(set.series.iter().filter_map(|s| s.color_key.as_deref()));

        let gutter = end_label_gutter(ctx, &set, plot);
        let SeriesAxes { x, y, plot } = series_axes(ctx, NAME, &set, plot.trim_right(gutter), false)?;
        draw_left_axis(&mut frame, ctx, &y, plot);
        draw_bottom_axis(&mut frame, ctx, &x, plot, false);

        let vars = ctx.variables();
        let stroke_width = vars.number_or("stroke_width", 2.0).max(0.5);
        let show_points = vars.flag_or("show_points", false);
        let show_data_labels = vars.flag_or("show_data_labels", false);
        let y_unit = ctx.column(ColumnRole::Y).and_then(|column| column.unit());
        let label_font = &ctx.typography().annotation;

        let mut end_labels = Vec::new();
        for series in &set.series {
            let color = pick_color(&mut colors, series.color_key.as_deref());
            let pixels: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|&(px, py)| (x.map(px), y.map(py)))
                .collect();
            if pixels.len() >= 2 {
                frame.push(
                    LayerKind::Marks,
                    PathPrimitive::polyline(&pixels, color, stroke_width),
                );
            }
            if show_points || pixels.len() == 1 {
                for &(cx, cy) in &pixels {
                    frame.push(
                        LayerKind::Marks,
                        CirclePrimitive::new(cx, cy, stroke_width + 1.5, color),
                    );
                }
            }

            if show_data_labels {
                let texts: Vec<String> = series
                    .points
                    .iter()
                    .map(|&(_, value)| ctx.format_value(value, y_unit))
                    .collect();
                let requests: Vec<PointLabel> = pixels
                    .iter()
                    .zip(&texts)
                    .map(|(&anchor, text)| {
                        let extent = ctx.measurer.measure(text, label_font);
                        PointLabel::new(anchor, extent.width, extent.height())
                    })
                    .collect();
                let config = LabelPlacementConfig {
                    offset: stroke_width + 4.0,
                    ..LabelPlacementConfig::default()
                }
                .with_bounds(plot.bounds());
                for placed in place_point_labels(&requests, &pixels, config)? {
                    let Some(bounds) = placed.bounds else {
                        continue;
                    };
                    frame.push(
                        LayerKind::Labels,
                        TextPrimitive::with_font(
                            texts[placed.index].clone(),
                            (bounds.x0 + bounds.x1) / 2.0,
                            (bounds.y0 + bounds.y1) / 2.0,
                            label_font,
                            ctx.theme.text,
                            TextHAlign::Center,
                        )
                        .with_v_align(TextVAlign::Middle),
                    );
                }
            }

            if let Some(&(_, last_y)) = pixels.last() {
                end_labels.push((series.name.clone(), last_y, color));
            }
        }

        if set.grouped {
            draw_end_labels(&mut frame, ctx, &end_labels, plot);
        }
        Ok(frame)
    }
}
