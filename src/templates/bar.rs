use crate::api::ColumnRole;
use crate::core::BandScale;
use crate::error::ChartResult;
use crate::render::{LayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, bottom_axis_height, category_gutter, display_text,
    domain_override, draw_bottom_axis, draw_category_label, ensure_rows, extent, legend_entries,
    legend_top, numeric_cell, pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "bar";

/// Horizontal bars, one per row, growing from zero.
pub(super) struct BarTemplate;

struct BarRow {
    label: String,
    value: f64,
    color_key: Option<String>,
}

impl ChartTemplate for BarTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Bar
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group, ColumnRole::Label]);

        let rows: Vec<BarRow> = ctx
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                Some(BarRow {
                    label: text_cell(NAME, i, row, label_column)?,
                    value: numeric_cell(NAME, i, row, value_column)?,
                    color_key: color_column.as_ref().map(|column| display_text(row, column)),
                })
            })
            .collect();
        ensure_rows(NAME, self.min_rows(), rows.len())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(rows.iter().filter_map(|row| row.color_key.as_deref()));
        let legend = color_column
            .as_ref()
            .is_some_and(|column| column.name != label_column.name);
        let plot = if legend {
            legend_top(&mut frame, ctx, &legend_entries(&colors), plot)
        } else {
            plot
        };

        let vars = ctx.variables();
        let show_values = vars.flag_or("show_values", true);
        let padding = vars.number_or("bar_padding", 0.2).clamp(0.0, 0.9);
        let unit = value_column.unit();
        let font = &ctx.typography().label;

        let labels: Vec<String> = rows.iter().map(|row| row.label.clone()).collect();
        let (labels, gutter) = category_gutter(ctx, &labels, plot.width * 0.35);
        let value_texts: Vec<String> = rows
            .iter()
            .map(|row| ctx.format_value(row.value, unit))
            .collect();
        let value_space = if show_values {
            value_texts
                .iter()
                .map(|text| ctx.measurer.width(text, font))
                .fold(0.0, f64::max)
                + TICK_LABEL_GAP
        } else {
            0.0
        };

        let (lo, hi) = extent(rows.iter().map(|row| row.value)).unwrap_or((0.0, 1.0));
        let (lo, hi, overridden) = domain_override(ctx, "x", lo.min(0.0), hi.max(0.0));
        let plot = plot
            .trim_left(gutter)
            .trim_right(value_space)
            .trim_bottom(bottom_axis_height(ctx))
            .ensure_usable(NAME)?;
        let axis = ValueAxis::numeric(lo, hi, plot.width, unit, !overridden)?
            .with_range(plot.x, plot.right());
        draw_bottom_axis(&mut frame, ctx, &axis, plot, true);

        let bands = BandScale::new(plot.y, plot.bottom(), rows.len())
            .with_padding(padding, padding / 2.0);
        let base = axis.baseline();
        for (i, row) in rows.iter().enumerate() {
            let color = pick_color(&mut colors, row.color_key.as_deref());
            let end = axis.map(axis.clamp(row.value));
            frame.push(
                LayerKind::Marks,
                RectPrimitive::new(
                    base.min(end),
                    bands.start(i),
                    (end - base).abs(),
                    bands.band_width(),
                    color,
                ),
            );
            draw_category_label(&mut frame, ctx, &labels[i], plot.x, bands.center(i));
            if show_values {
                let (x, align) = if row.value < 0.0 {
                    (end - TICK_LABEL_GAP, TextHAlign::Right)
                } else {
                    (end + TICK_LABEL_GAP, TextHAlign::Left)
                };
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(
                        value_texts[i].clone(),
                        x,
                        bands.center(i),
                        font,
                        ctx.theme.text,
                        align,
                    )
                    .with_v_align(TextVAlign::Middle),
                );
            }
        }
        Ok(frame)
    }
}
