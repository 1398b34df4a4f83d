use tracing::warn;

use crate::api::{ColumnSpec, Row};
use crate::core::ticks::{AXIS_MAX_TICKS, AXIS_MIN_TICKS, AXIS_TARGET_SPACING_PX};
use crate::core::{
    FontSpec, LinearScale, OrdinalColorScale, PlotArea, format_number, format_with_unit,
    parse_number, parse_temporal, temporal_ticks, tick_target_count, truncate_to_width,
    value_text,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    Color, LayerKind, LinePrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive,
    TextVAlign,
};

use super::TemplateContext;

const HEADER_LINE_GAP: f64 = 4.0;
const HEADER_GAP: f64 = 12.0;
const LEGEND_ITEM_GAP: f64 = 14.0;
const LEGEND_SWATCH_GAP: f64 = 5.0;
const LEGEND_BOTTOM_GAP: f64 = 10.0;
pub(crate) const TICK_LABEL_GAP: f64 = 6.0;

/// Frame with the chrome drawn, plus the area left for marks.
pub(crate) struct Canvas {
    pub frame: RenderFrame,
    pub plot: PlotArea,
}

/// Starts a frame: background, title, subtitle and source note.
pub(crate) fn begin(ctx: &TemplateContext<'_>, template: &'static str) -> ChartResult<Canvas> {
    let mut frame = RenderFrame::new(ctx.viewport);
    if let Some(background) = ctx.theme.background {
        frame = frame.with_background(background);
    }

    let mut area = ctx.viewport.area().inset(ctx.margins);
    let typography = ctx.typography();
    let vars = ctx.variables();
    let mut has_header = false;

    for (name, font) in [("title", &typography.title), ("subtitle", &typography.annotation)] {
        let Some(text) = vars.text(name) else {
            continue;
        };
        let extent = ctx.measurer.measure(&text, font);
        let fitted = truncate_to_width(ctx.measurer, &text, font, area.width.max(0.0));
        if !fitted.is_empty() {
            frame.push(
                LayerKind::Annotation,
                TextPrimitive::with_font(
                    fitted,
                    area.x,
                    area.y + extent.ascent,
                    font,
                    ctx.theme.text,
                    TextHAlign::Left,
                ),
            );
        }
        area = area.trim_top(extent.height() + HEADER_LINE_GAP);
        has_header = true;
    }
    if has_header {
        area = area.trim_top(HEADER_GAP - HEADER_LINE_GAP);
    }

    if let Some(source) = vars.text("source") {
        let font = &typography.annotation;
        let extent = ctx.measurer.measure(&source, font);
        let fitted = truncate_to_width(ctx.measurer, &source, font, area.width.max(0.0));
        if !fitted.is_empty() {
            frame.push(
                LayerKind::Annotation,
                TextPrimitive::with_font(
                    fitted,
                    area.x,
                    area.bottom() - extent.descent,
                    font,
                    ctx.theme.text,
                    TextHAlign::Left,
                ),
            );
        }
        area = area.trim_bottom(extent.height() + HEADER_GAP);
    }

    let plot = area.ensure_usable(template)?;
    Ok(Canvas { frame, plot })
}

pub(crate) fn ensure_rows(template: &'static str, required: usize, found: usize) -> ChartResult<()> {
    if found < required {
        return Err(ChartError::InsufficientData {
            template,
            required,
            found,
        });
    }
    Ok(())
}

/// Numeric cell of `column`, logging rows that cannot be used.
pub(crate) fn numeric_cell(
    template: &'static str,
    index: usize,
    row: &Row,
    column: &ColumnSpec,
) -> Option<f64> {
    let value = column.number(row);
    if value.is_none() {
        warn!(
            template,
            row = index,
            column = %column.name,
            "skipping row: cell is missing or not numeric"
        );
    }
    value
}

/// Text cell of `column`, logging rows that cannot be used.
pub(crate) fn text_cell(
    template: &'static str,
    index: usize,
    row: &Row,
    column: &ColumnSpec,
) -> Option<String> {
    let value = column.text(row);
    if value.is_none() {
        warn!(
            template,
            row = index,
            column = %column.name,
            "skipping row: cell is empty"
        );
    }
    value
}

/// Distinct values in first-appearance order.
pub(crate) fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|known| known == value) {
            seen.push(value.to_owned());
        }
    }
    seen
}

/// Min and max of finite values; `None` for an empty input.
pub(crate) fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Color for an optional category key; rows without a key use the first color.
pub(crate) fn pick_color(colors: &mut OrdinalColorScale, key: Option<&str>) -> Color {
    match key {
        Some(key) => colors.color_for(key),
        None => colors.first(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LegendEntry {
    pub label: String,
    pub color: Color,
}

pub(crate) fn legend_entries(scale: &OrdinalColorScale) -> Vec<LegendEntry> {
    scale
        .entries()
        .map(|(label, color)| LegendEntry {
            label: label.to_owned(),
            color,
        })
        .collect()
}

/// Draws a wrapping swatch legend across the top of `area`.
///
/// Returns the area left below the legend.
pub(crate) fn legend_top(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    entries: &[LegendEntry],
    area: PlotArea,
) -> PlotArea {
    if entries.is_empty() {
        return area;
    }
    let font = &ctx.typography().label;
    let swatch = font.size_px() * 0.8;
    let row_height = font.size_px() * 1.4;
    let mut x = area.x;
    let mut y = area.y;
    for entry in entries {
        let label = truncate_to_width(
            ctx.measurer,
            &entry.label,
            font,
            (area.width - swatch - LEGEND_SWATCH_GAP).max(0.0),
        );
        let width = swatch + LEGEND_SWATCH_GAP + ctx.measurer.width(&label, font);
        if x > area.x && x + width > area.right() {
            x = area.x;
            y += row_height;
        }
        draw_legend_item(frame, ctx, font, entry.color, label, x, y, row_height);
        x += width + LEGEND_ITEM_GAP;
    }
    area.trim_top(y + row_height - area.y + LEGEND_BOTTOM_GAP)
}

/// Draws a one-column legend at the right edge of `area`, vertically centred.
///
/// Returns the area left of the legend.
pub(crate) fn legend_right(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    entries: &[LegendEntry],
    area: PlotArea,
) -> PlotArea {
    if entries.is_empty() {
        return area;
    }
    let font = &ctx.typography().label;
    let swatch = font.size_px() * 0.8;
    let row_height = font.size_px() * 1.5;
    let max_text = (area.width * 0.4 - swatch - LEGEND_SWATCH_GAP).max(0.0);
    let labels: Vec<String> = entries
        .iter()
        .map(|entry| truncate_to_width(ctx.measurer, &entry.label, font, max_text))
        .collect();
    let text_width = labels
        .iter()
        .map(|label| ctx.measurer.width(label, font))
        .fold(0.0, f64::max);
    let width = swatch + LEGEND_SWATCH_GAP + text_width;
    let x = area.right() - width;
    let total = row_height * entries.len() as f64;
    let mut y = area.y + ((area.height - total) / 2.0).max(0.0);
    for (entry, label) in entries.iter().zip(labels) {
        draw_legend_item(frame, ctx, font, entry.color, label, x, y, row_height);
        y += row_height;
    }
    area.trim_right(width + LEGEND_ITEM_GAP)
}

#[allow(clippy::too_many_arguments)]
fn draw_legend_item(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    font: &FontSpec,
    color: Color,
    label: String,
    x: f64,
    y: f64,
    row_height: f64,
) {
    let swatch = font.size_px() * 0.8;
    frame.push(
        LayerKind::Annotation,
        RectPrimitive::new(x, y + (row_height - swatch) / 2.0, swatch, swatch, color)
            .with_corner_radius(2.0),
    );
    if !label.is_empty() {
        frame.push(
            LayerKind::Annotation,
            TextPrimitive::with_font(
                label,
                x + swatch + LEGEND_SWATCH_GAP,
                y + row_height / 2.0,
                font,
                ctx.theme.text,
                TextHAlign::Left,
            )
            .with_v_align(TextVAlign::Middle),
        );
    }
}

/// Payload overrides for an axis extent (`<axis>_min` / `<axis>_max`).
pub(crate) fn domain_override(
    ctx: &TemplateContext<'_>,
    axis: &str,
    lo: f64,
    hi: f64,
) -> (f64, f64, bool) {
    let vars = ctx.variables();
    let min = vars.number(&format!("{axis}_min"));
    let max = vars.number(&format!("{axis}_max"));
    let overridden = min.is_some() || max.is_some();
    (min.unwrap_or(lo), max.unwrap_or(hi), overridden)
}

/// Linear axis with formatted tick labels.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValueAxis {
    pub scale: LinearScale,
    pub ticks: Vec<(f64, String)>,
}

impl ValueAxis {
    /// Axis over `[lo, hi]`; `nice` extends the domain to round tick values.
    pub fn numeric(
        lo: f64,
        hi: f64,
        span_px: f64,
        unit: Option<&str>,
        nice: bool,
    ) -> ChartResult<Self> {
        let count = tick_target_count(
            span_px,
            AXIS_TARGET_SPACING_PX,
            AXIS_MIN_TICKS,
            AXIS_MAX_TICKS,
        );
        let mut scale = LinearScale::covering(lo, hi)?;
        if nice {
            scale = scale.nice(count);
        }
        let ticks = scale
            .ticks(count)
            .into_iter()
            .map(|tick| (tick, format_with_unit(&format_number(tick, None), unit)))
            .collect();
        Ok(Self { scale, ticks })
    }

    /// Calendar axis over unix seconds.
    pub fn temporal(lo: f64, hi: f64, span_px: f64) -> ChartResult<Self> {
        let count = tick_target_count(
            span_px,
            AXIS_TARGET_SPACING_PX * 1.25,
            AXIS_MIN_TICKS,
            AXIS_MAX_TICKS,
        );
        let scale = LinearScale::covering(lo, hi)?;
        let (lo, hi) = scale.domain();
        let ticks = temporal_ticks(lo, hi, count)
            .into_iter()
            .map(|tick| (tick.position, tick.label))
            .collect();
        Ok(Self { scale, ticks })
    }

    #[must_use]
    pub fn with_range(mut self, start: f64, end: f64) -> Self {
        self.scale = self.scale.with_range(start, end);
        self
    }

    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        self.scale.map(value)
    }

    #[must_use]
    pub fn label_width(&self, ctx: &TemplateContext<'_>) -> f64 {
        let font = &ctx.typography().label;
        self.ticks
            .iter()
            .map(|(_, label)| ctx.measurer.width(label, font))
            .fold(0.0, f64::max)
    }

    /// `value` limited to the axis domain.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        let (a, b) = self.scale.domain();
        value.clamp(a.min(b), a.max(b))
    }

    /// Pixel of zero, or of the domain edge nearest to it.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        self.map(self.clamp(0.0))
    }

    fn contains(&self, value: f64) -> bool {
        let (a, b) = self.scale.domain();
        value >= a.min(b) && value <= a.max(b)
    }
}

/// Category labels truncated to `max_width`, plus the gutter they need.
pub(crate) fn category_gutter(
    ctx: &TemplateContext<'_>,
    labels: &[String],
    max_width: f64,
) -> (Vec<String>, f64) {
    let font = &ctx.typography().label;
    let fitted: Vec<String> = labels
        .iter()
        .map(|label| truncate_to_width(ctx.measurer, label, font, max_width.max(0.0)))
        .collect();
    let width = fitted
        .iter()
        .map(|label| ctx.measurer.width(label, font))
        .fold(0.0, f64::max);
    (fitted, width + TICK_LABEL_GAP)
}

/// Right-aligned category label left of `x`, vertically centred on `y`.
pub(crate) fn draw_category_label(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    label: &str,
    x: f64,
    y: f64,
) {
    if label.is_empty() {
        return;
    }
    frame.push(
        LayerKind::Labels,
        TextPrimitive::with_font(
            label,
            x - TICK_LABEL_GAP,
            y,
            &ctx.typography().label,
            ctx.theme.text,
            TextHAlign::Right,
        )
        .with_v_align(TextVAlign::Middle),
    );
}

/// Height reserved under the plot for a bottom axis.
pub(crate) fn bottom_axis_height(ctx: &TemplateContext<'_>) -> f64 {
    ctx.measurer
        .measure("0", &ctx.typography().label)
        .height()
        + TICK_LABEL_GAP
}

/// Horizontal gridlines and tick labels left of `plot`.
pub(crate) fn draw_left_axis(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    axis: &ValueAxis,
    plot: PlotArea,
) {
    let font = &ctx.typography().label;
    let gridlines = ctx.show_gridlines();
    let grid_style = ctx.gridline_style();
    for (tick, label) in &axis.ticks {
        let y = axis.map(*tick);
        if gridlines {
            frame.push(
                LayerKind::Grid,
                LinePrimitive::new(plot.x, y, plot.right(), y, 1.0, ctx.theme.other)
                    .with_style(grid_style),
            );
        }
        frame.push(
            LayerKind::Axis,
            TextPrimitive::with_font(
                label.clone(),
                plot.x - TICK_LABEL_GAP,
                y,
                font,
                ctx.theme.text,
                TextHAlign::Right,
            )
            .with_v_align(TextVAlign::Middle),
        );
    }
    if axis.contains(0.0) {
        let y = axis.map(0.0);
        frame.push(
            LayerKind::Axis,
            LinePrimitive::new(plot.x, y, plot.right(), y, 1.0, ctx.theme.text),
        );
    }
}

/// Vertical gridlines and tick labels under `plot`.
pub(crate) fn draw_bottom_axis(
    frame: &mut RenderFrame,
    ctx: &TemplateContext<'_>,
    axis: &ValueAxis,
    plot: PlotArea,
    baseline_at_zero: bool,
) {
    let font = &ctx.typography().label;
    let gridlines = ctx.show_gridlines();
    let grid_style = ctx.gridline_style();
    for (tick, label) in &axis.ticks {
        let x = axis.map(*tick);
        if gridlines {
            frame.push(
                LayerKind::Grid,
                LinePrimitive::new(x, plot.y, x, plot.bottom(), 1.0, ctx.theme.other)
                    .with_style(grid_style),
            );
        }
        frame.push(
            LayerKind::Axis,
            TextPrimitive::with_font(
                label.clone(),
                x,
                plot.bottom() + TICK_LABEL_GAP,
                font,
                ctx.theme.text,
                TextHAlign::Center,
            )
            .with_v_align(TextVAlign::Top),
        );
    }
    if baseline_at_zero && axis.contains(0.0) {
        let x = axis.map(0.0);
        frame.push(
            LayerKind::Axis,
            LinePrimitive::new(x, plot.y, x, plot.bottom(), 1.0, ctx.theme.text),
        );
    } else {
        frame.push(
            LayerKind::Axis,
            LinePrimitive::new(
                plot.x,
                plot.bottom(),
                plot.right(),
                plot.bottom(),
                1.0,
                ctx.theme.text,
            ),
        );
    }
}

/// Parsed `x` column of a line-like chart.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct XValues {
    /// One entry per payload row; `None` for unusable cells.
    pub values: Vec<Option<f64>>,
    pub temporal: bool,
}

/// Reads `x` cells as dates when every present cell is a date string, as
/// numbers otherwise. Year-only strings stay numeric.
pub(crate) fn parse_x_values(rows: &[Row], column: &ColumnSpec) -> XValues {
    let cells: Vec<Option<&serde_json::Value>> = rows
        .iter()
        .map(|row| row.get(&column.name).filter(|v| !v.is_null()))
        .collect();
    let temporal = cells.iter().flatten().count() > 0
        && cells.iter().flatten().all(|cell| {
            parse_number(cell).is_none()
                && cell
                    .as_str()
                    .and_then(parse_temporal)
                    .is_some()
        });
    let values = cells
        .into_iter()
        .map(|cell| {
            let cell = cell?;
            if temporal {
                cell.as_str().and_then(parse_temporal)
            } else {
                parse_number(cell)
            }
        })
        .collect();
    XValues { values, temporal }
}

/// Display text of any cell, falling back to an empty string.
pub(crate) fn display_text(row: &Row, column: &ColumnSpec) -> String {
    row.get(&column.name)
        .and_then(value_text)
        .map(|text| text.trim().to_owned())
        .unwrap_or_default()
}
