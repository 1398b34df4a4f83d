use indexmap::IndexMap;

use crate::api::ColumnRole;
use crate::core::BandScale;
use crate::error::ChartResult;
use crate::render::{CirclePrimitive, Color, LayerKind, LinePrimitive, RenderFrame};

use super::common::{
    Canvas, ValueAxis, begin, bottom_axis_height, category_gutter, display_text, domain_override,
    draw_bottom_axis, draw_category_label, ensure_rows, extent, legend_entries, legend_top,
    numeric_cell, pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "dot_plot";
const RANGE_LINE_WIDTH: f64 = 2.0;

/// One row per label: a range line spanning its groups and one dot per group.
pub(super) struct DotPlotTemplate;

struct Dot {
    value: f64,
    color_key: String,
}

impl ChartTemplate for DotPlotTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::DotPlot
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value, ColumnRole::Group]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let group_column = ctx.require(NAME, ColumnRole::Group)?;
        let color_column = ctx
            .color_column(&[ColumnRole::Group])
            .unwrap_or_else(|| group_column.clone());

        let mut rows: IndexMap<String, Vec<Dot>> = IndexMap::new();
        let mut used = 0;
        for (i, row) in ctx.rows().iter().enumerate() {
            let Some(label) = text_cell(NAME, i, row, label_column) else {
                continue;
            };
            let Some(value) = numeric_cell(NAME, i, row, value_column) else {
                continue;
            };
            rows.entry(label).or_default().push(Dot {
                value,
                color_key: display_text(row, &color_column),
            });
            used += 1;
        }
        ensure_rows(NAME, self.min_rows(), used)?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(rows.values().flatten().map(|dot| dot.color_key.as_str()));
        let plot = legend_top(&mut frame, ctx, &legend_entries(&colors), plot);

        let dot_radius = ctx.variables().number_or("dot_radius", 6.0).max(1.0);
        let (lo, hi) = extent(rows.values().flatten().map(|dot| dot.value)).unwrap_or((0.0, 1.0));
        let (lo, hi, overridden) = domain_override(ctx, "x", lo, hi);

        let labels: Vec<String> = rows.keys().cloned().collect();
        let (labels, gutter) = category_gutter(ctx, &labels, plot.width * 0.3);
        let plot = plot
            .trim_left(gutter)
            .trim_bottom(bottom_axis_height(ctx))
            .ensure_usable(NAME)?;
        let axis = ValueAxis::numeric(lo, hi, plot.width, value_column.unit(), !overridden)?
            .with_range(plot.x + dot_radius, plot.right() - dot_radius);
        draw_bottom_axis(&mut frame, ctx, &axis, plot, false);

        let bands = BandScale::new(plot.y, plot.bottom(), rows.len()).with_padding(0.0, 0.0);
        for (i, dots) in rows.values().enumerate() {
            let y = bands.center(i);
            if let Some((min, max)) = extent(dots.iter().map(|dot| dot.value)) {
                if max > min {
                    frame.push(
                        LayerKind::Marks,
                        LinePrimitive::new(
                            axis.map(axis.clamp(min)),
                            y,
                            axis.map(axis.clamp(max)),
                            y,
                            RANGE_LINE_WIDTH,
                            ctx.theme.other,
                        ),
                    );
                }
            }
            for dot in dots {
                let color = pick_color(&mut colors, Some(&dot.color_key));
                frame.push(
                    LayerKind::Marks,
                    CirclePrimitive::new(axis.map(axis.clamp(dot.value)), y, dot_radius, color)
                        .with_border(1.0, ctx.theme.background.unwrap_or(Color::WHITE)),
                );
            }
            draw_category_label(&mut frame, ctx, &labels[i], plot.x, y);
        }
        Ok(frame)
    }
}
