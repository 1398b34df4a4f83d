use indexmap::IndexMap;

use crate::api::ColumnRole;
use crate::core::BandScale;
use crate::error::ChartResult;
use crate::render::{LayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign};

use super::common::{
    Canvas, ValueAxis, begin, bottom_axis_height, category_gutter, display_text, distinct,
    domain_override, draw_bottom_axis, draw_category_label, ensure_rows, legend_entries,
    legend_top, numeric_cell, pick_color, text_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "stacked_bar";

/// Horizontal stacked bars; negative parts stack leftward from zero.
pub(super) struct StackedBarTemplate;

struct Segment {
    group: String,
    value: f64,
    color_key: Option<String>,
}

impl ChartTemplate for StackedBarTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::StackedBar
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::Label, ColumnRole::Group, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let label_column = ctx.require(NAME, ColumnRole::Label)?;
        let group_column = ctx.require(NAME, ColumnRole::Group)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;
        let color_column = ctx.color_column(&[ColumnRole::Group]);
        let normalize = ctx.variables().flag_or("normalize", false);

        let mut stacks: IndexMap<String, Vec<Segment>> = IndexMap::new();
        let mut used = 0;
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
            let color_key = color_column.as_ref().map(|column| display_text(row, column));
            stacks.entry(label).or_default().push(Segment {
                group,
                value,
                color_key,
            });
            used += 1;
        }
        ensure_rows(NAME, self.min_rows(), used)?;

        if normalize {
            for segments in stacks.values_mut() {
                let total: f64 = segments.iter().map(|segment| segment.value.abs()).sum();
                if total > 0.0 {
                    for segment in segments.iter_mut() {
                        segment.value = segment.value / total * 100.0;
                    }
                }
            }
        }

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let mut colors = ctx.color_scale();
        let groups = distinct(
            stacks
                .values()
                .flatten()
                .map(|segment| segment.group.as_str()),
        );
        colors.assign_all(
            stacks
                .values()
                .flatten()
                .filter_map(|segment| segment.color_key.as_deref()),
        );
        let plot = legend_top(&mut frame, ctx, &legend_entries(&colors), plot);

        let (negative_extent, positive_extent) =
            stacks
                .values()
                .fold((0.0_f64, 0.0_f64), |(neg, pos), segments| {
                    let negative: f64 = segments.iter().map(|s| s.value.min(0.0)).sum();
                    let positive: f64 = segments.iter().map(|s| s.value.max(0.0)).sum();
                    (neg.min(negative), pos.max(positive))
                });
        let unit = if normalize {
            Some("%")
        } else {
            value_column.unit()
        };
        let (lo, hi, overridden) = domain_override(ctx, "x", negative_extent, positive_extent);

        let labels: Vec<String> = stacks.keys().cloned().collect();
        let (labels, gutter) = category_gutter(ctx, &labels, plot.width * 0.3);
        let plot = plot
            .trim_left(gutter)
            .trim_bottom(bottom_axis_height(ctx))
            .ensure_usable(NAME)?;
        let nice = !overridden && !normalize;
        let axis =
            ValueAxis::numeric(lo, hi, plot.width, unit, nice)?.with_range(plot.x, plot.right());
        draw_bottom_axis(&mut frame, ctx, &axis, plot, true);

        let padding = ctx.variables().number_or("bar_padding", 0.2).clamp(0.0, 0.9);
        let show_values = ctx.variables().flag_or("show_values", false);
        let font = &ctx.typography().annotation;
        let bands = BandScale::new(plot.y, plot.bottom(), stacks.len())
            .with_padding(padding, padding / 2.0);

        for (i, segments) in stacks.values().enumerate() {
            let mut positive = 0.0;
            let mut negative = 0.0;
            // Stack in legend order so segments line up across bars.
            let ordered = groups
                .iter()
                .flat_map(|group| segments.iter().filter(move |s| &s.group == group));
            for segment in ordered {
                let (from, to) = if segment.value >= 0.0 {
                    let from = positive;
                    positive += segment.value;
                    (from, positive)
                } else {
                    let from = negative;
                    negative += segment.value;
                    (from, negative)
                };
                let x0 = axis.map(axis.clamp(from));
                let x1 = axis.map(axis.clamp(to));
                let color = pick_color(&mut colors, segment.color_key.as_deref());
                let width = (x1 - x0).abs();
                frame.push(
                    LayerKind::Marks,
                    RectPrimitive::new(
                        x0.min(x1),
                        bands.start(i),
                        width,
                        bands.band_width(),
                        color,
                    ),
                );
                if show_values && segment.value != 0.0 {
                    let text = ctx.format_value(segment.value, unit);
                    let extent = ctx.measurer.measure(&text, font);
                    if extent.width + 4.0 <= width && extent.height() <= bands.band_width() {
                        frame.push(
                            LayerKind::Labels,
                            TextPrimitive::with_font(
                                text,
                                (x0 + x1) / 2.0,
                                bands.center(i),
                                font,
                                color.contrasting_text(),
                                TextHAlign::Center,
                            )
                            .with_v_align(TextVAlign::Middle),
                        );
                    }
                }
            }
            draw_category_label(&mut frame, ctx, &labels[i], plot.x, bands.center(i));
        }
        Ok(frame)
    }
}
