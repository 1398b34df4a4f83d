use crate::api::ColumnRole;
use crate::core::{BandScale, truncate_to_width};
use crate::error::ChartResult;
use crate::render::{LayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, display_text, domain_override, draw_left_axis,
    ensure_rows, extent, legend_entries, legend_top, numeric_cell, pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "column";
const ROTATED_LABEL_DEG: f64 = -45.0;

/// Vertical columns, one per row, growing from zero.
pub(super) struct ColumnTemplate;

struct ColumnRow {
    label: String,
    value: f64,
    color_key: Option<String>,
}

impl ChartTemplate for ColumnTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Column
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group, ColumnRole::Label]);

        let rows: Vec<ColumnRow> = ctx
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                Some(ColumnRow {
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
        let line_height = ctx.measurer.measure("0", font).height();

        let value_space = if show_values {
            line_height + TICK_LABEL_GAP
        } else {
            0.0
        };
        let (lo, hi) = extent(rows.iter().map(|row| row.value)).unwrap_or((0.0, 1.0));
        let (lo, hi, overridden) = domain_override(ctx, "y", lo.min(0.0), hi.max(0.0));
        let probe = ValueAxis::numeric(lo, hi, plot.height, unit, !overridden)?;
        let plot = plot.trim_left(probe.label_width(ctx) + TICK_LABEL_GAP);

        // Labels rotate when any of them is wider than its band.
        let step = BandScale::new(plot.x, plot.right(), rows.len())
            .with_padding(padding, padding / 2.0)
            .step();
        let widest = rows
            .iter()
            .map(|row| ctx.measurer.width(&row.label, font))
            .fold(0.0, f64::max);
        let rotated = widest > step;
        let (labels, label_space) = if rotated {
            let angle = ROTATED_LABEL_DEG.to_radians().abs();
            let diagonal = (plot.height * 0.3 / angle.sin()).max(0.0);
            let labels: Vec<String> = rows
                .iter()
                .map(|row| truncate_to_width(ctx.measurer, &row.label, font, diagonal))
                .collect();
            let longest = labels
                .iter()
                .map(|label| ctx.measurer.width(label, font))
                .fold(0.0, f64::max);
            let space = longest * angle.sin() + line_height * angle.cos() + TICK_LABEL_GAP;
            (labels, space)
        } else {
            (
                rows.iter().map(|row| row.label.clone()).collect(),
                line_height + TICK_LABEL_GAP,
            )
        };

        let plot = plot
            .trim_top(value_space)
            .trim_bottom(label_space)
            .ensure_usable(NAME)?;
        let axis = probe.with_range(plot.bottom(), plot.y);
        draw_left_axis(&mut frame, ctx, &axis, plot);

        let bands = BandScale::new(plot.x, plot.right(), rows.len())
            .with_padding(padding, padding / 2.0);
        let base = axis.baseline();
        for (i, row) in rows.iter().enumerate() {
            let color = pick_color(&mut colors, row.color_key.as_deref());
            let end = axis.map(axis.clamp(row.value));
            frame.push(
                LayerKind::Marks,
                RectPrimitive::new(
                    bands.start(i),
                    base.min(end),
                    bands.band_width(),
                    (end - base).abs(),
                    color,
                ),
            );

            let label = &labels[i];
            if !label.is_empty() {
                let text = if rotated {
                    TextPrimitive::with_font(
                        label.clone(),
                        bands.center(i),
                        plot.bottom() + TICK_LABEL_GAP,
                        font,
                        ctx.theme.text,
                        TextHAlign::Right,
                    )
                    .with_v_align(TextVAlign::Middle)
                    .with_rotation(ROTATED_LABEL_DEG)
                } else {
                    TextPrimitive::with_font(
                        label.clone(),
                        bands.center(i),
                        plot.bottom() + TICK_LABEL_GAP,
                        font,
                        ctx.theme.text,
                        TextHAlign::Center,
                    )
                    .with_v_align(TextVAlign::Top)
                };
                frame.push(LayerKind::Labels, text);
            }

            if show_values {
                let (y, v_align) = if row.value < 0.0 {
                    (end + TICK_LABEL_GAP, TextVAlign::Top)
                } else {
                    (end - TICK_LABEL_GAP, TextVAlign::Baseline)
                };
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(
                        ctx.format_value(row.value, unit),
                        bands.center(i),
                        y,
                        font,
                        ctx.theme.text,
                        TextHAlign::Center,
                    )
                    .with_v_align(v_align),
                );
            }
        }
        Ok(frame)
    }
}
