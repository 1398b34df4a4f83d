use tracing::{debug, warn};

use crate::api::ColumnRole;
use crate::core::truncate_to_width;
use crate::error::ChartResult;
use crate::layout::{TrianglePackingConfig, fit_triangles, pack_triangles};
use crate::render::{
    Color, LayerKind, PathPrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, begin, display_text, ensure_rows, legend_entries, legend_top,
    numeric_cell, pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "proportional_triangles";
const LABEL_ROWS: f64 = 2.0;

/// A strip of equilateral triangles whose areas are proportional to their values.
pub(super) struct ProportionalTrianglesTemplate;

struct Item {
    label: String,
    value: f64,
    color_key: Option<String>,
}

impl ChartTemplate for ProportionalTrianglesTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::ProportionalTriangles
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group]);

        let mut items = Vec::new();
        for (i, row) in ctx.rows().iter().enumerate() {
            let Some(label) = text_cell(NAME, i, row, label_column) else {
                continue;
            };
            let Some(value) = numeric_cell(NAME, i, row, value_column) else {
                continue;
            };
            if value <= 0.0 {
                warn!(template = NAME, row = i, value, "skipping non-positive value");
                continue;
            }
            items.push(Item {
                label,
                value,
                color_key: color_column.as_ref().map(|column| display_text(row, column)),
            });
        }
        ensure_rows(NAME, self.min_rows(), items.len())?;

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        colors.assign_all(items.iter().filter_map(|item| item.color_key.as_deref()));
        let plot = if color_column.is_some() {
            legend_top(&mut frame, ctx, &legend_entries(&colors), plot)
        } else {
            plot
        };

        let vars = ctx.variables();
        let show_values = vars.flag_or("show_values", false);
        let font = &ctx.typography().label;
        let line_height = ctx.measurer.measure("0", font).height();
        // Up and down triangles nest, so their labels alternate between two rows.
        let plot = plot
            .trim_bottom(line_height * LABEL_ROWS + TICK_LABEL_GAP)
            .ensure_usable(NAME)?;

        let areas: Vec<f64> = items.iter().map(|item| item.value).collect();
        let padding_px = vars.number_or("packing_padding", 2.0).max(0.0);
        let first = pack_triangles(&areas, TrianglePackingConfig::default())?;
        let (_, rough_scale) = fit_triangles(&first, plot);
        let packing = if padding_px > 0.0 && rough_scale > 0.0 {
            pack_triangles(
                &areas,
                TrianglePackingConfig {
                    padding: padding_px / rough_scale,
                    ..TrianglePackingConfig::default()
                },
            )?
        } else {
            first
        };
        let (triangles, scale) = fit_triangles(&packing, plot);
        debug!(template = NAME, triangles = triangles.len(), scale, "fitted triangle packing");

        let strip_bottom = triangles
            .iter()
            .map(|triangle| triangle.extent().3)
            .fold(plot.y, f64::max);
        for triangle in &triangles {
            let item = &items[triangle.index];
            if triangle.side <= 0.0 {
                continue;
            }
            let color = pick_color(&mut colors, item.color_key.as_deref());
            frame.push(
                LayerKind::Marks,
                PathPrimitive::polygon(&triangle.vertices, color)
                    .with_stroke(ctx.theme.background.unwrap_or(Color::WHITE), 1.0),
            );

            let text = if show_values {
                format!(
                    "{} ({})",
                    item.label,
                    ctx.format_value(item.value, value_column.unit())
                )
            } else {
                item.label.clone()
            };
            let (cx, _) = triangle.centroid();
            let fitted = truncate_to_width(ctx.measurer, &text, font, triangle.side.max(0.0));
            if fitted.is_empty() {
                continue;
            }
            let row = if triangle.pointing_up { 0.0 } else { 1.0 };
            frame.push(
                LayerKind::Labels,
                TextPrimitive::with_font(
                    fitted,
                    cx,
                    strip_bottom + TICK_LABEL_GAP + row * line_height,
                    font,
                    ctx.theme.text,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Top),
            );
        }
        Ok(frame)
    }
}
