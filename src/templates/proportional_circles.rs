use std::f64::consts::SQRT_2;

use tracing::{debug, warn};

use crate::api::ColumnRole;
use crate::error::ChartResult;
use crate::layout::{CirclePackingConfig, fit_circles, pack_circles};
use crate::render::{
    CirclePrimitive, Color, ImagePrimitive, LayerKind, RenderFrame, TextHAlign, TextPrimitive,
    TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, begin, display_text, ensure_rows, legend_entries, legend_top,
    numeric_cell, pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "proportional_circles";

/// Packed circles whose areas are proportional to their values.
pub(super) struct ProportionalCirclesTemplate;

struct Item {
    label: String,
    value: f64,
    image: Option<String>,
    color_key: Option<String>,
}

impl ChartTemplate for ProportionalCirclesTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::ProportionalCircles
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group]);
        let image_column = ctx.image_column();

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
                image: image_column.as_ref().and_then(|column| column.text(row)),
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
        let padding_px = vars.number_or("packing_padding", 2.0).max(0.0);
        let show_values = vars.flag_or("show_values", true);
        let label_font = &ctx.typography().label;
        let value_font = &ctx.typography().annotation;
        let line_height = ctx.measurer.measure("0", label_font).height();
        let plot = plot
            .trim_bottom(line_height + TICK_LABEL_GAP)
            .ensure_usable(NAME)?;

        // Padding is given in pixels; a first pass finds the pixels-per-unit
        // factor so the second pass can pack with padding in data units.
        let radii: Vec<f64> = items.iter().map(|item| item.value.sqrt()).collect();
        let first = pack_circles(&radii, CirclePackingConfig::default())?;
        let (_, rough_scale) = fit_circles(&first, plot);
        let packing = if padding_px > 0.0 && rough_scale > 0.0 {
            pack_circles(
                &radii,
                CirclePackingConfig {
                    padding: padding_px / rough_scale,
                    ..CirclePackingConfig::default()
                },
            )?
        } else {
            first
        };
        let (circles, scale) = fit_circles(&packing, plot);
        debug!(template = NAME, circles = circles.len(), scale, "fitted circle packing");

        for circle in &circles {
            let item = &items[circle.index];
            if circle.radius <= 0.0 {
                continue;
            }
            let color = pick_color(&mut colors, item.color_key.as_deref());
            frame.push(
                LayerKind::Marks,
                CirclePrimitive::new(circle.x, circle.y, circle.radius, color)
                    .with_border(1.0, ctx.theme.background.unwrap_or(Color::WHITE)),
            );
            if let Some(href) = &item.image {
                let side = circle.radius * SQRT_2;
                frame.push(
                    LayerKind::Marks,
                    ImagePrimitive::new(
                        href.clone(),
                        circle.x - side / 2.0,
                        circle.y - side / 2.0,
                        side,
                        side,
                    ),
                );
            }

            let value_text = ctx.format_value(item.value, value_column.unit());
            let label_width = ctx.measurer.width(&item.label, label_font);
            let value_width = if show_values {
                ctx.measurer.width(&value_text, value_font)
            } else {
                0.0
            };
            let lines = if show_values { 2.0 } else { 1.0 };
            let inside = item.image.is_none()
                && label_width.max(value_width) <= circle.radius * 1.6
                && line_height * lines <= circle.radius * 1.4;

            if inside {
                let text_color = color.contrasting_text();
                let label_y = if show_values {
                    circle.y - line_height / 2.0
                } else {
                    circle.y
                };
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(
                        item.label.clone(),
                        circle.x,
                        label_y,
                        label_font,
                        text_color,
                        TextHAlign::Center,
                    )
                    .with_v_align(TextVAlign::Middle),
                );
                if show_values {
                    frame.push(
                        LayerKind::Labels,
                        TextPrimitive::with_font(
                            value_text,
                            circle.x,
                            circle.y + line_height / 2.0,
                            value_font,
                            text_color,
                            TextHAlign::Center,
                        )
                        .with_v_align(TextVAlign::Middle),
                    );
                }
            } else {
                frame.push(
                    LayerKind::Labels,
                    TextPrimitive::with_font(
                        item.label.clone(),
                        circle.x,
                        circle.y + circle.radius + 2.0,
                        label_font,
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
