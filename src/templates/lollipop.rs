use crate::api::ColumnRole;
use crate::core::BandScale;
use crate::error::ChartResult;
use crate::render::{
    CirclePrimitive, LayerKind, LinePrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, bottom_axis_height, category_gutter, display_text,
    domain_override, draw_bottom_axis, draw_category_label, ensure_rows, extent, numeric_cell,
    pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "lollipop";
const STEM_WIDTH: f64 = 2.0;

/// Horizontal stems from zero ending in a dot at the value.
pub(super) struct LollipopTemplate;

struct Stick {
    label: String,
    value: f64,
    color_key: Option<String>,
}

impl ChartTemplate for LollipopTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Lollipop
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group]);

        let sticks: Vec<Stick> = ctx
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                Some(Stick {
                    label: text_cell(NAME, i, row, label_column)?,
                    value: numeric_cell(NAME, i, row, value_column)?,
                    color_key: color_column.as_ref().map(|column| display_text(row, column)),
                })
            })
            .collect();
        ensure_rows(NAME, self.min_rows(), sticks.len())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(sticks.iter().filter_map(|stick| stick.color_key.as_deref()));

        let vars = ctx.variables();
        let dot_radius = vars.number_or("dot_radius", 6.0).max(1.0);
        let show_values = vars.flag_or("show_values", true);
        let unit = value_column.unit();
        let value_font = &ctx.typography().annotation;

        let (lo, hi) = extent(sticks.iter().map(|stick| stick.value)).unwrap_or((0.0, 1.0));
        let (lo, hi, overridden) = domain_override(ctx, "x", lo.min(0.0), hi.max(0.0));
        let value_space = if show_values {
            sticks
                .iter()
                .map(|stick| ctx.measurer.width(&ctx.format_value(stick.value, unit), value_font))
                .fold(0.0, f64::max)
                + TICK_LABEL_GAP
        } else {
            0.0
        };

        let labels: Vec<String> = sticks.iter().map(|stick| stick.label.clone()).collect();
        let (labels, gutter) = category_gutter(ctx, &labels, plot.width * 0.3);
        let plot = plot
            .trim_left(gutter)
            .trim_bottom(bottom_axis_height(ctx))
            .ensure_usable(NAME)?;
        // Dots and value labels must stay inside the plot on both sides.
        let reach = dot_radius + value_space;
        let left_reach = if lo < 0.0 { reach } else { dot_radius };
        let right_reach = if hi > 0.0 { reach } else { dot_radius };
        let axis = ValueAxis::numeric(lo, hi, plot.width, unit, !overridden)?.with_range(
            plot.x + left_reach.min(plot.width / 3.0),
            plot.right() - right_reach.min(plot.width / 3.0),
        );
        draw_bottom_axis(&mut frame, ctx, &axis, plot, true);

        let bands = BandScale::new(plot.y, plot.bottom(), sticks.len()).with_padding(0.0, 0.0);
        let base = axis.baseline();
        for (i, stick) in sticks.iter().enumerate() {
            let color = pick_color(&mut colors, stick.color_key.as_deref());
            let y = bands.center(i);
            let x = axis.map(axis.clamp(stick.value));
            if (x - base).abs() > 0.0 {
                frame.push(
                    LayerKind::Marks,
                    LinePrimitive::new(base, y, x, y, STEM_WIDTH, color),
                );
            }
            frame.push(LayerKind::Marks, CirclePrimitive::new(x, y, dot_radius, color));

            if show_values {
                let (text_x, align) = if stick.value < 0.0 {
                    (x - dot_radius - 3.0, TextHAlign::Right)
                } else {
                    (x + dot_radius + 3.0, TextHAlign::Left)
                };
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(
                        ctx.format_value(stick.value, unit),
                        text_x,
                        y,
                        value_font,
                        ctx.theme.text,
                        align,
                    )
                    .with_v_align(TextVAlign::Middle),
                );
            }
            draw_category_label(&mut frame, ctx, &labels[i], plot.x, y);
        }
        Ok(frame)
    }
}
