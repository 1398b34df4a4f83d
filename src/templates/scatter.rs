use crate::api::ColumnRole;
use crate::core::SqrtScale;
use crate::error::ChartResult;
use crate::render::{
    CirclePrimitive, Color, ImagePrimitive, LayerKind, RenderFrame, TextHAlign, TextPrimitive,
    TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, ValueAxis, begin, bottom_axis_height, display_text, domain_override,
    draw_bottom_axis, draw_left_axis, ensure_rows, extent, legend_entries, legend_top,
    numeric_cell, pick_color,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "scatter";

/// One circle per row at (x, y), optionally sized and labelled.
pub(super) struct ScatterTemplate;

struct ScatterPoint {
    x: f64,
    y: f64,
    size: Option<f64>,
    label: Option<String>,
    image: Option<String>,
    color_key: Option<String>,
}

impl ChartTemplate for ScatterTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Scatter
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::X, ColumnRole::Y]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let x_column = ctx.require(NAME, ColumnRole::X)?;
        let y_column = ctx.require(NAME, ColumnRole::Y)?;
        let size_column = ctx.column(ColumnRole::Size);
        let label_column = ctx.column(ColumnRole::Label);
        let color_column = ctx.color_column(&[ColumnRole::Group]);
        let image_column = ctx.image_column();

        let points: Vec<ScatterPoint> = ctx
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                Some(ScatterPoint {
                    x: numeric_cell(NAME, i, row, x_column)?,
                    y: numeric_cell(NAME, i, row, y_column)?,
                    size: size_column.and_then(|column| column.number(row)),
                    label: label_column.and_then(|column| column.text(row)),
                    image: image_column.as_ref().and_then(|column| column.text(row)),
                    color_key: color_column.as_ref().map(|column| display_text(row, column)),
                })
            })
            .collect();
        ensure_rows(NAME, self.min_rows(), points.len())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(points.iter().filter_map(|point| point.color_key.as_deref()));
        let plot = if color_column.is_some() {
            legend_top(&mut frame, ctx, &legend_entries(&colors), plot)
        } else {
            plot
        };

        let vars = ctx.variables();
        let point_radius = vars.number_or("point_radius", 5.0).max(0.5);
        let max_radius = vars.number_or("max_point_radius", 18.0).max(point_radius);
        let show_labels = vars.flag_or("show_labels", false);
        let size_scale = extent(points.iter().filter_map(|point| point.size))
            .filter(|(_, hi)| *hi > 0.0)
            .map(|(_, hi)| SqrtScale::new(hi, max_radius))
            .transpose()?;
        let radius_of = |point: &ScatterPoint| match (size_scale, point.size) {
            (Some(scale), Some(size)) => scale.map(size).max(1.0),
            _ => point_radius,
        };
        let largest = points.iter().map(radius_of).fold(0.0, f64::max);

        let (x_lo, x_hi) = extent(points.iter().map(|p| p.x)).unwrap_or((0.0, 1.0));
        let (y_lo, y_hi) = extent(points.iter().map(|p| p.y)).unwrap_or((0.0, 1.0));
        let (x_lo, x_hi, x_fixed) = domain_override(ctx, "x", x_lo, x_hi);
        let (y_lo, y_hi, y_fixed) = domain_override(ctx, "y", y_lo, y_hi);
        let x_unit = x_column.unit();
        let y_unit = y_column.unit();

        let y_probe = ValueAxis::numeric(y_lo, y_hi, plot.height, y_unit, !y_fixed)?;
        let plot = plot
            .trim_left(y_probe.label_width(ctx) + TICK_LABEL_GAP)
            .trim_bottom(bottom_axis_height(ctx))
            .ensure_usable(NAME)?;
        let x_axis = ValueAxis::numeric(x_lo, x_hi, plot.width, x_unit, !x_fixed)?;
        // Keep the largest circle inside the plot.
        let inner = largest.min(plot.width / 4.0).min(plot.height / 4.0);
        let x_axis = x_axis.with_range(plot.x + inner, plot.right() - inner);
        let y_axis = y_probe.with_range(plot.bottom() - inner, plot.y + inner);
        draw_left_axis(&mut frame, ctx, &y_axis, plot);
        draw_bottom_axis(&mut frame, ctx, &x_axis, plot, false);

        let font = &ctx.typography().annotation;
        for point in &points {
            let color = pick_color(&mut colors, point.color_key.as_deref());
            let cx = x_axis.map(point.x);
            let cy = y_axis.map(point.y);
            let radius = radius_of(point);
            frame.push(
                LayerKind::Marks,
                CirclePrimitive::new(cx, cy, radius, color.with_alpha(0.85))
                    .with_border(1.0, Color::WHITE),
            );
            if let Some(href) = &point.image {
                let side = radius * 2.0;
                frame.push(
                    LayerKind::Marks,
                    ImagePrimitive::new(href.clone(), cx - radius, cy - radius, side, side),
                );
            }
            if show_labels {
                if let Some(label) = &point.label {
                    frame.push(
                        LayerKind::Labels,
                        TextPrimitive::with_font(
                            label.clone(),
                            cx + radius + 3.0,
                            cy,
                            font,
                            ctx.theme.text,
                            TextHAlign::Left,
                        )
                        .with_v_align(TextVAlign::Middle),
                    );
                }
            }
        }
        Ok(frame)
    }
}
