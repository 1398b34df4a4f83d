use crate::api::ColumnRole;
use crate::core::{FontWeight, truncate_to_width};
use crate::error::ChartResult;
use crate::layout::{StackedLabel, resolve_vertical_collisions};
use crate::render::{
    CirclePrimitive, LayerKind, LinePrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, display_text, ensure_rows, extent, numeric_cell,
    pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "slope";
const LABEL_GAP: f64 = 2.0;
const MAX_GUTTER_SHARE: f64 = 0.35;

/// One line per row between a `start` axis on the left and an `end` axis on the right.
pub(super) struct SlopeTemplate;

struct SlopeRow {
    label: String,
    start: f64,
    end: f64,
    color_key: Option<String>,
}

impl ChartTemplate for SlopeTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Slope
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Start, ColumnRole::End]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let start_column = ctx.require(NAME, ColumnRole::Start)?;
        let end_column = ctx.require(NAME, ColumnRole::End)?;
        let color_column = ctx.color_column(&[ColumnRole::Group, ColumnRole::Label]);

        let rows: Vec<SlopeRow> = ctx
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                Some(SlopeRow {
                    label: text_cell(NAME, i, row, label_column)?,
                    start: numeric_cell(NAME, i, row, start_column)?,
                    end: numeric_cell(NAME, i, row, end_column)?,
                    color_key: color_column.as_ref().map(|column| display_text(row, column)),
                })
            })
            .collect();
        ensure_rows(NAME, self.min_rows(), rows.len())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(rows.iter().filter_map(|row| row.color_key.as_deref()));

        let vars = ctx.variables();
        let dot_radius = vars.number_or("dot_radius", 4.0).max(0.0);
        let stroke_width = vars.number_or("stroke_width", 2.0).max(0.5);
        let label_font = &ctx.typography().label;
        let header_font = label_font.clone().with_weight(FontWeight::BOLD);
        let line_height = ctx.measurer.measure("0", label_font).height();
        let start_unit = start_column.unit();
        let end_unit = end_column.unit();

        let max_gutter = plot.width * MAX_GUTTER_SHARE;
        let left_texts: Vec<String> = rows
            .iter()
            .map(|row| {
                let text = format!("{} {}", row.label, ctx.format_value(row.start, start_unit));
                truncate_to_width(ctx.measurer, &text, label_font, max_gutter)
            })
            .collect();
        let right_texts: Vec<String> = rows
            .iter()
            .map(|row| {
                let text = format!("{} {}", ctx.format_value(row.end, end_unit), row.label);
                truncate_to_width(ctx.measurer, &text, label_font, max_gutter)
            })
            .collect();
        let widest = |texts: &[String]| {
            texts
                .iter()
                .map(|text| ctx.measurer.width(text, label_font))
                .fold(0.0, f64::max)
        };
        let left_gutter = widest(&left_texts) + dot_radius + TICK_LABEL_GAP;
        let right_gutter = widest(&right_texts) + dot_radius + TICK_LABEL_GAP;

        let header_height = ctx.measurer.measure("0", &header_font).height() + TICK_LABEL_GAP;
        let plot = plot
            .trim_left(left_gutter)
            .trim_right(right_gutter)
            .trim_top(header_height)
            .ensure_usable(NAME)?;
        let left_x = plot.x;
        let right_x = plot.right();

        for (column, x, align) in [
            (start_column, left_x, TextHAlign::Right),
            (end_column, right_x, TextHAlign::Left),
        ] {
            frame.push(
                LayerKind::Annotation,
                TextPrimitive::with_font(
                    column.name.clone(),
                    x,
                    plot.y - TICK_LABEL_GAP,
                    &header_font,
                    ctx.theme.text,
                    align,
                ),
            );
            frame.push(
                LayerKind::Axis,
                LinePrimitive::new(x, plot.y, x, plot.bottom(), 1.0, ctx.theme.other),
            );
        }

        let (lo, hi) = extent(rows.iter().flat_map(|row| [row.start, row.end])).unwrap_or((0.0, 1.0));
        let axis = ValueAxis::numeric(lo, hi, plot.height, None, false)?.with_range(
            plot.bottom() - line_height / 2.0,
            plot.y + line_height / 2.0,
        );

        let mut left_ideal = Vec::with_capacity(rows.len());
        let mut right_ideal = Vec::with_capacity(rows.len());
        let mut row_colors = Vec::with_capacity(rows.len());
        for row in &rows {
            let color = pick_color(&mut colors, row.color_key.as_deref());
            let y0 = axis.map(row.start);
            let y1 = axis.map(row.end);
            frame.push(
                LayerKind::Marks,
                LinePrimitive::new(left_x, y0, right_x, y1, stroke_width, color),
            );
            if dot_radius > 0.0 {
                frame.push(LayerKind::Marks, CirclePrimitive::new(left_x, y0, dot_radius, color));
                frame.push(LayerKind::Marks, CirclePrimitive::new(right_x, y1, dot_radius, color));
            }
            left_ideal.push(StackedLabel::new(y0, line_height));
            right_ideal.push(StackedLabel::new(y1, line_height));
            row_colors.push(color);
        }

        let left_y = resolve_vertical_collisions(&left_ideal, plot.y, plot.bottom(), LABEL_GAP);
        let right_y = resolve_vertical_collisions(&right_ideal, plot.y, plot.bottom(), LABEL_GAP);
        for (i, &color) in row_colors.iter().enumerate() {
            for (text, x, y, align) in [
                (&left_texts[i], left_x - dot_radius - TICK_LABEL_GAP, left_y[i], TextHAlign::Right),
                (&right_texts[i], right_x + dot_radius + TICK_LABEL_GAP, right_y[i], TextHAlign::Left),
            ] {
                if text.is_empty() {
                    continue;
                }
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(text.clone(), x, y, label_font, color, align)
                        .with_v_align(TextVAlign::Middle),
                );
            }
        }
        Ok(frame)
    }
}
