use std::f64::consts::{FRAC_PI_2, PI, TAU};

use tracing::warn;

use crate::api::ColumnRole;
use crate::error::ChartResult;
use crate::render::{
    Color, LayerKind, PathCommand, PathPrimitive, RenderFrame, TextHAlign, TextPrimitive,
    TextVAlign,
};

use super::common::{
    Canvas, LegendEntry, begin, display_text, ensure_rows, legend_right, numeric_cell, pick_color,
    text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "pie";
const SLICE_BORDER_PX: f64 = 1.0;

/// Slices clockwise from twelve o'clock; `inner_radius_ratio` turns it into a donut.
pub(super) struct PieTemplate;

struct Slice {
    label: String,
    value: f64,
    color_key: Option<String>,
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn arc(radius: f64, sweep: bool, span: f64, (x, y): (f64, f64)) -> PathCommand {
    PathCommand::ArcTo {
        radius,
        large_arc: span > PI,
        sweep,
        x,
        y,
    }
}

/// Outline of one slice between `start` and `end` (radians, screen coordinates).
fn slice_commands(
    (cx, cy): (f64, f64),
    outer: f64,
    inner: f64,
    start: f64,
    end: f64,
) -> Vec<PathCommand> {
    let span = end - start;
    if span >= TAU - 1e-9 {
        // A full turn cannot be one arc; draw two halves per ring.
        let mut commands = vec![
            PathCommand::MoveTo(cx, cy - outer),
            arc(outer, true, PI, (cx, cy + outer)),
            arc(outer, true, PI, (cx, cy - outer)),
            PathCommand::Close,
        ];
        if inner > 0.0 {
            commands.extend([
                PathCommand::MoveTo(cx, cy - inner),
                arc(inner, false, PI, (cx, cy + inner)),
                arc(inner, false, PI, (cx, cy - inner)),
                PathCommand::Close,
            ]);
        }
        return commands;
    }

    let (ox0, oy0) = polar(cx, cy, outer, start);
    let outer_end = polar(cx, cy, outer, end);
    if inner > 0.0 {
        let (ix1, iy1) = polar(cx, cy, inner, end);
        let inner_start = polar(cx, cy, inner, start);
        vec![
            PathCommand::MoveTo(ox0, oy0),
            arc(outer, true, span, outer_end),
            PathCommand::LineTo(ix1, iy1),
            arc(inner, false, span, inner_start),
            PathCommand::Close,
        ]
    } else {
        vec![
            PathCommand::MoveTo(cx, cy),
            PathCommand::LineTo(ox0, oy0),
            arc(outer, true, span, outer_end),
            PathCommand::Close,
        ]
    }
}

impl ChartTemplate for PieTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Pie
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Label]);

        let mut slices = Vec::new();
        for (i, row) in ctx.rows().iter().enumerate() {
            let Some(label) = text_cell(NAME, i, row, label_column) else {
                continue;
            };
            let Some(value) = numeric_cell(NAME, i, row, value_column) else {
                continue;
            };
            if value <= 0.0 {
                warn!(template = NAME, row = i, value, "skipping non-positive slice");
                continue;
            }
            let color_key = color_column.as_ref().map(|column| display_text(row, column));
            slices.push(Slice {
                label,
                value,
                color_key,
            });
        }
        ensure_rows(NAME, self.min_rows(), slices.len())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        let slice_colors: Vec<Color> = slices
            .iter()
            .map(|slice| pick_color(&mut colors, slice.color_key.as_deref()))
            .collect();
        let mut legend: Vec<LegendEntry> = Vec::new();
        for (slice, color) in slices.iter().zip(&slice_colors) {
            if !legend.iter().any(|entry| entry.label == slice.label) {
                legend.push(LegendEntry {
                    label: slice.label.clone(),
                    color: *color,
                });
            }
        }
        let plot = legend_right(&mut frame, ctx, &legend, plot).ensure_usable(NAME)?;

        let vars = ctx.variables();
        let ratio = vars.number_or("inner_radius_ratio", 0.0).clamp(0.0, 0.95);
        let show_values = vars.flag_or("show_values", true);
        let center = (plot.center_x(), plot.center_y());
        let outer = plot.width.min(plot.height) / 2.0;
        let inner = outer * ratio;
        let total: f64 = slices.iter().map(|slice| slice.value).sum();
        let font = &ctx.typography().annotation;
        // Donut labels sit mid-ring; pie labels a bit outside the centre.
        let label_radius = if inner > 0.0 {
            (outer + inner) / 2.0
        } else {
            outer * 0.65
        };

        let mut start = -FRAC_PI_2;
        for (slice, &color) in slices.iter().zip(&slice_colors) {
            let span = slice.value / total * TAU;
            let end = start + span;
            frame.push(
                LayerKind::Marks,
                PathPrimitive::filled(slice_commands(center, outer, inner, start, end), color)
                    .with_stroke(ctx.theme.background.unwrap_or(Color::WHITE), SLICE_BORDER_PX),
            );

            if show_values {
                let share = slice.value / total * 100.0;
                let text = ctx.format_value(share, Some("%"));
                let extent = ctx.measurer.measure(&text, font);
                let fits = slices.len() == 1
                    || (span * label_radius >= extent.width + 4.0
                        && outer - inner >= extent.height());
                if fits {
                    let (x, y) = if slices.len() == 1 && inner == 0.0 {
                        center
                    } else {
                        polar(center.0, center.1, label_radius, start + span / 2.0)
                    };
                    frame.push(
                        LayerKind::Labels,
                        TextPrimitive::with_font(
                            text,
                            x,
                            y,
                            font,
                            color.contrasting_text(),
                            TextHAlign::Center,
                        )
                        .with_v_align(TextVAlign::Middle),
                    );
                }
            }
            start = end;
        }
        Ok(frame)
    }
}
