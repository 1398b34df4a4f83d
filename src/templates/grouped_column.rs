use indexmap::IndexMap;
use tracing::warn;

use crate::api::ColumnRole;
use crate::core::{BandScale, truncate_to_width};
use crate::error::ChartResult;
use crate::render::{LayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, display_text, distinct, domain_override,
    draw_left_axis, ensure_rows, extent, legend_entries, legend_top, numeric_cell, pick_color,
    text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "grouped_column";

/// Columns clustered per label, one column per group.
pub(super) struct GroupedColumnTemplate;

impl ChartTemplate for GroupedColumnTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::GroupedColumn
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Group, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let group_column = ctx.require(NAME, ColumnRole::Group)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group]);

        // (label, group) -> (value, color key); the first row for a pair wins.
        let mut cells: IndexMap<(String, String), (f64, Option<String>)> = IndexMap::new();
        for (i, row) in ctx.rows().iter().enumerate() {
            let Some(label) = text_cell(NAME, i, row, label_column) else {
                continue;
            };
            let Some(group) = text_cell(NAME, i, row, group_column) else {
                continue;
            };
            let Some(value) = numeric_cell(NAME, i, row, value_column) else {
                continue;
            };
            let key = (label, group);
            if cells.contains_key(&key) {
                warn!(template = NAME, row = i, "duplicate label/group pair; keeping the first");
                continue;
            }
            let color_key = color_column.as_ref().map(|column| display_text(row, column));
            cells.insert(key, (value, color_key));
        }
        ensure_rows(NAME, self.min_rows(), cells.len())?;

        let labels = distinct(cells.keys().map(|(label, _)| label.as_str()));
        let groups = distinct(cells.keys().map(|(_, group)| group.as_str()));

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(cells.values().filter_map(|(_, key)| key.as_deref()));
        let plot = legend_top(&mut frame, ctx, &legend_entries(&colors), plot);

        let vars = ctx.variables();
        let show_values = vars.flag_or("show_values", false);
        let padding = vars.number_or("bar_padding", 0.2).clamp(0.0, 0.9);
        let unit = value_column.unit();
        let font = &ctx.typography().label;
        let line_height = ctx.measurer.measure("0", font).height();

        let (lo, hi) = extent(cells.values().map(|(value, _)| *value)).unwrap_or((0.0, 1.0));
        let (lo, hi, overridden) = domain_override(ctx, "y", lo.min(0.0), hi.max(0.0));
        let probe = ValueAxis::numeric(lo, hi, plot.height, unit, !overridden)?;
        let value_space = if show_values {
            line_height + TICK_LABEL_GAP
        } else {
            0.0
        };
        let plot = plot
            .trim_left(probe.label_width(ctx) + TICK_LABEL_GAP)
            .trim_top(value_space)
            .trim_bottom(line_height + TICK_LABEL_GAP)
            .ensure_usable(NAME)?;
        let axis = probe.with_range(plot.bottom(), plot.y);
        draw_left_axis(&mut frame, ctx, &axis, plot);

        let outer = BandScale::new(plot.x, plot.right(), labels.len())
            .with_padding(padding, padding / 2.0);
        let base = axis.baseline();
        for (i, label) in labels.iter().enumerate() {
            let inner = BandScale::new(
                outer.start(i),
                outer.start(i) + outer.band_width(),
                groups.len(),
            )
            .with_padding(0.05, 0.0);
            for (j, group) in groups.iter().enumerate() {
                let Some((value, color_key)) = cells.get(&(label.clone(), group.clone())) else {
                    continue;
                };
                let color = pick_color(&mut colors, color_key.as_deref());
                let end = axis.map(axis.clamp(*value));
                frame.push(
                    LayerKind::Marks,
                    RectPrimitive::new(
                        inner.start(j),
                        base.min(end),
                        inner.band_width(),
                        (end - base).abs(),
                        color,
                    ),
                );
                if show_values {
                    let (y, v_align) = if *value < 0.0 {
                        (end + 2.0, TextVAlign::Top)
                    } else {
                        (end - 2.0, TextVAlign::Baseline)
                    };
                    frame.push(
                        LayerKind::Labels,
                        TextPrimitive::with_font(
                            ctx.format_value(*value, unit),
                            inner.center(j),
                            y,
                            &ctx.typography().annotation,
                            ctx.theme.text,
                            TextHAlign::Center,
                        )
                        .with_v_align(v_align),
                    );
                }
            }

            let fitted = truncate_to_width(ctx.measurer, label, font, outer.step());
            if !fitted.is_empty() {
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(
                        fitted,
                        outer.center(i),
                        plot.bottom() + TICK_LABEL_GAP,
                        font,
                        ctx.theme.text,
                        TextHAlign::Center,
                    )
                    .with_v_align(TextVAlign::Top),
                );
            }
        }
        Ok(frame)
    }
}
