use indexmap::IndexMap;
use tracing::warn;

use crate::api::ColumnRole;
use crate::core::{BandScale, truncate_to_width};
use crate::error::ChartResult;
use crate::render::{
    Color, LayerKind, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign,
};

use super::common::{
    Canvas, TICK_LABEL_GAP, begin, category_gutter, display_text, distinct, draw_category_label,
    ensure_rows, extent, numeric_cell,
};
use super::{ChartTemplate, TemplateContext, TemplateKind};

const NAME: &str = "heatmap";
const LEGEND_STEPS: usize = 5;
const LEGEND_SWATCH_WIDTH: f64 = 24.0;
const LEGEND_SWATCH_HEIGHT: f64 = 10.0;
const LEGEND_GAP: f64 = 10.0;
const CELL_GAP: f64 = 1.0;

/// Grid of x by y cells colored along a two-color ramp.
pub(super) struct HeatmapTemplate;

/// Linear ramp between two colors over a value domain.
#[derive(Debug, Clone, Copy)]
struct ColorRamp {
    low: Color,
    high: Color,
    min: f64,
    max: f64,
}

impl ColorRamp {
    /// The first two palette colors, or white to the only color of a one-color palette.
    fn resolve(ctx: &TemplateContext<'_>, min: f64, max: f64) -> Self {
        let (low, high) = match ctx.theme.palette.palette() {
            [low, high, ..] => (*low, *high),
            _ => (Color::WHITE, ctx.theme.palette.first()),
        };
        Self {
            low,
            high,
            min,
            max,
        }
    }

    fn color(&self, value: f64) -> Color {
        let t = if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            0.5
        };
        self.low.lerp(self.high, t.clamp(0.0, 1.0))
    }
}

impl ChartTemplate for HeatmapTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Heatmap
    }

    fn required_roles(&self) -> &'static [ColumnRole] {
        &[ColumnRole::X, ColumnRole::Y, ColumnRole::Value]
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
        let x_column = ctx.require(NAME, ColumnRole::X)?;
        let y_column = ctx.require(NAME, ColumnRole::Y)?;
        let value_column = ctx.require(NAME, ColumnRole::Value)?;

        let mut cells: IndexMap<(String, String), f64> = IndexMap::new();
        for (i, row) in ctx.rows().iter().enumerate() {
            let x = display_text(row, x_column);
            let y = display_text(row, y_column);
            if x.is_empty() || y.is_empty() {
                warn!(template = NAME, row = i, "skipping row: x or y cell is empty");
                continue;
            }
            let Some(value) = numeric_cell(NAME, i, row, value_column) else {
                continue;
            };
            let key = (x, y);
            if cells.contains_key(&key) {
                warn!(template = NAME, row = i, "duplicate x/y pair; keeping the first");
                continue;
            }
            cells.insert(key, value);
        }
        ensure_rows(NAME, self.min_rows(), cells.len())?;

        let xs = distinct(cells.keys().map(|(x, _)| x.as_str()));
        let ys = distinct(cells.keys().map(|(_, y)| y.as_str()));
        let (min, max) = extent(cells.values().copied()).unwrap_or((0.0, 1.0));
        let ramp = ColorRamp::resolve(ctx, min, max);
        let unit = value_column.unit();

        let Canvas { mut frame, plot } = begin(ctx, NAME)?;
        let label_font = &ctx.typography().label;
        let value_font = &ctx.typography().annotation;
        let line_height = ctx.measurer.measure("0", label_font).height();

        // Stepped legend: min label, swatches, max label.
        let min_text = ctx.format_value(min, unit);
        let max_text = ctx.format_value(max, unit);
        let legend_y = plot.y + (line_height - LEGEND_SWATCH_HEIGHT).max(0.0) / 2.0;
        let min_width = ctx.measurer.width(&min_text, label_font);
        let mut x = plot.x;
        frame.push(
            LayerKind::Annotation,
            TextPrimitive::with_font(
                min_text,
                x,
                plot.y + line_height / 2.0,
                label_font,
                ctx.theme.text,
                TextHAlign::Left,
            )
            .with_v_align(TextVAlign::Middle),
        );
        x += min_width + TICK_LABEL_GAP;
        for step in 0..LEGEND_STEPS {
            let t = step as f64 / (LEGEND_STEPS - 1) as f64;
            frame.push(
                LayerKind::Annotation,
                RectPrimitive::new(
                    x,
                    legend_y,
                    LEGEND_SWATCH_WIDTH,
                    LEGEND_SWATCH_HEIGHT,
                    ramp.low.lerp(ramp.high, t),
                ),
            );
            x += LEGEND_SWATCH_WIDTH;
        }
        frame.push(
            LayerKind::Annotation,
            TextPrimitive::with_font(
                max_text,
                x + TICK_LABEL_GAP,
                plot.y + line_height / 2.0,
                label_font,
                ctx.theme.text,
                TextHAlign::Left,
            )
            .with_v_align(TextVAlign::Middle),
        );

        let (y_labels, gutter) = category_gutter(ctx, &ys, plot.width * 0.3);
        let plot = plot
            .trim_top(line_height.max(LEGEND_SWATCH_HEIGHT) + LEGEND_GAP)
            .trim_left(gutter)
            .trim_bottom(line_height + TICK_LABEL_GAP)
            .ensure_usable(NAME)?;

        let columns = BandScale::new(plot.x, plot.right(), xs.len());
        let rows = BandScale::new(plot.y, plot.bottom(), ys.len());
        let show_values = ctx.variables().flag_or("show_values", true);
        let cell_width = (columns.band_width() - CELL_GAP).max(0.5);
        let cell_height = (rows.band_width() - CELL_GAP).max(0.5);

        for ((x_key, y_key), value) in &cells {
            let (Some(col), Some(row)) = (
                xs.iter().position(|x| x == x_key),
                ys.iter().position(|y| y == y_key),
            ) else {
                continue;
            };
            let fill = ramp.color(*value);
            let cell_x = columns.start(col) + CELL_GAP / 2.0;
            let cell_y = rows.start(row) + CELL_GAP / 2.0;
            frame.push(
                LayerKind::Marks,
                RectPrimitive::new(cell_x, cell_y, cell_width, cell_height, fill),
            );
            if show_values {
                let text = ctx.format_value(*value, unit);
                let extent = ctx.measurer.measure(&text, value_font);
                if extent.width + 4.0 <= cell_width && extent.height() <= cell_height {
                    frame.push(
                        LayerKind::Labels,
                        TextPrimitive::with_font(
                            text,
                            columns.center(col),
                            rows.center(row),
                            value_font,
                            fill.contrasting_text(),
                            TextHAlign::Center,
                        )
                        .with_v_align(TextVAlign::Middle),
                    );
                }
            }
        }

        for (i, label) in y_labels.iter().enumerate() {
            draw_category_label(&mut frame, ctx, label, plot.x, rows.center(i));
        }
        for (i, label) in xs.iter().enumerate() {
            let fitted = truncate_to_width(ctx.measurer, label, label_font, columns.step());
            if fitted.is_empty() {
                continue;
            }
            frame.push(
                LayerKind::Labels,
                TextPrimitive::with_font(
                    fitted,
                    columns.center(i),
                    plot.bottom() + TICK_LABEL_GAP,
                    label_font,
                    ctx.theme.text,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Top),
            );
        }
        Ok(frame)
    }
}
