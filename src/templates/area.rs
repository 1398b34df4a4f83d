use crate::api::ColumnRole;
use crate::error::ChartResult;
use crate::render::{CirclePrimitive, LayerKind, PathCommand, PathPrimitive, RenderFrame};

use super::common::{
    Canvas, begin, draw_bottom_axis, draw_left_axis, ensure_rows, legend_entries, legend_top,
    pick_color,
};
use super::line::{SeriesAxes, parse_series, series_axes};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "area";

/// Filled series down to the zero baseline, each with an outline.
pub(super) struct AreaTemplate;

impl ChartTemplate for AreaTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Area
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
        let plot = if set.grouped {
            legend_top(&mut frame, ctx, &legend_entries(&colors), plot)
        } else {
            plot
        };

        let SeriesAxes { x, y, plot } = series_axes(ctx, NAME, &set, plot, true)?;
        draw_left_axis(&mut frame, ctx, &y, plot);
        draw_bottom_axis(&mut frame, ctx, &x, plot, false);

        let vars = ctx.variables();
        let opacity = vars.number_or("area_opacity", 0.3).clamp(0.0, 1.0);
        let stroke_width = vars.number_or("stroke_width", 2.0).max(0.5);
        let base = y.baseline();

        for series in &set.series {
            let color = pick_color(&mut colors, series.color_key.as_deref());
            let pixels: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|&(px, py)| (x.map(px), y.map(y.clamp(py))))
                .collect();
            let (Some(&(first_x, _)), Some(&(last_x, _))) = (pixels.first(), pixels.last()) else {
                continue;
            };
            if pixels.len() == 1 {
                frame.push(
                    LayerKind::Marks,
                    CirclePrimitive::new(first_x, pixels[0].1, stroke_width + 1.5, color),
                );
                continue;
            }

            let mut commands = Vec::with_capacity(pixels.len() + 3);
            commands.push(PathCommand::MoveTo(first_x, base));
            commands.extend(pixels.iter().map(|&(px, py)| PathCommand::LineTo(px, py)));
            commands.push(PathCommand::LineTo(last_x, base));
            commands.push(PathCommand::Close);
            frame.push(
                LayerKind::Marks,
                PathPrimitive::filled(commands, color.with_alpha(opacity)),
            );
            frame.push(
                LayerKind::Marks,
                PathPrimitive::polyline(&pixels, color, stroke_width),
            );
        }
        Ok(frame)
    }
}
