use std::fmt::Write as _;

use crate::core::FontWeight;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, Color, ImagePrimitive, LinePrimitive, PathCommand, PathPrimitive, Primitive,
    RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive, TextVAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SvgRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub paths_drawn: usize,
    pub texts_drawn: usize,
    pub images_drawn: usize,
}

/// Serializes frames into standalone SVG markup.
///
/// The root element carries explicit `width`/`height` plus a matching
/// `viewBox`; every non-empty layer becomes one `<g>` group.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    root_class: Option<String>,
    last_svg: Option<String>,
    last_stats: SvgRenderStats,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `class` attribute of the `<svg>` root for subsequent renders.
    pub fn set_root_class(&mut self, class: Option<String>) {
        self.root_class = class;
    }

    #[must_use]
    pub fn last_svg(&self) -> Option<&str> {
        self.last_svg.as_deref()
    }

    pub fn take_svg(&mut self) -> Option<String> {
        self.last_svg.take()
    }

    #[must_use]
    pub fn last_stats(&self) -> SvgRenderStats {
        self.last_stats
    }

    fn write_frame(&self, frame: &RenderFrame) -> Result<(String, SvgRenderStats), std::fmt::Error> {
        let width = frame.viewport.width;
        let height = frame.viewport.height;
        let mut out = String::with_capacity(256 + frame.primitive_count() * 96);
        let mut stats = SvgRenderStats::default();

        write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}""#
        )?;
        if let Some(class) = &self.root_class {
            write!(out, r#" class="{}""#, escape_xml(class))?;
        }
        out.push_str(">\n");

        if let Some(background) = frame.background.filter(|bg| !bg.is_transparent()) {
            write!(out, r#"<rect class="background" width="{width}" height="{height}""#)?;
            write_paint(&mut out, "fill", Some(background))?;
            out.push_str("/>\n");
        }

        for layer in &frame.layers {
            if layer.primitives.is_empty() {
                continue;
            }
            writeln!(out, r#"<g class="{}">"#, layer.kind.css_class())?;
            for primitive in &layer.primitives {
                match primitive {
                    Primitive::Line(line) => {
                        write_line(&mut out, line)?;
                        stats.lines_drawn += 1;
                    }
                    Primitive::Rect(rect) => {
                        write_rect(&mut out, rect)?;
                        stats.rects_drawn += 1;
                    }
                    Primitive::Circle(circle) => {
                        write_circle(&mut out, circle)?;
                        stats.circles_drawn += 1;
                    }
                    Primitive::Path(path) => {
                        write_path(&mut out, path)?;
                        stats.paths_drawn += 1;
                    }
                    Primitive::Text(text) => {
                        write_text(&mut out, text)?;
                        stats.texts_drawn += 1;
                    }
                    Primitive::Image(image) => {
                        write_image(&mut out, image)?;
                        stats.images_drawn += 1;
                    }
                }
            }
            out.push_str("</g>\n");
        }

        out.push_str("</svg>\n");
        Ok((out, stats))
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        let (svg, stats) = self
            .write_frame(frame)
            .map_err(|err| ChartError::InvalidData(format!("failed to write svg: {err}")))?;
        self.last_svg = Some(svg);
        self.last_stats = stats;
        Ok(())
    }
}

/// Inline markup shown in a container when a chart cannot be drawn.
#[must_use]
pub fn error_markup(message: &str) -> String {
    format!(
        r#"<div class="chart-error" role="alert">{}</div>"#,
        escape_xml(message)
    )
}

/// Compact coordinate formatting: two decimals at most, no trailing zeros.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

fn write_paint(out: &mut String, name: &str, color: Option<Color>) -> std::fmt::Result {
    match color {
        Some(color) if !color.is_transparent() => {
            write!(out, r#" {name}="{}""#, color.to_hex())?;
            if color.alpha < 1.0 {
                write!(out, r#" {name}-opacity="{}""#, num(color.alpha))?;
            }
            Ok(())
        }
        _ => write!(out, r#" {name}="none""#),
    }
}

fn write_line(out: &mut String, line: &LinePrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}""#,
        num(line.x1),
        num(line.y1),
        num(line.x2),
        num(line.y2)
    )?;
    write_paint(out, "stroke", Some(line.color))?;
    write!(out, r#" stroke-width="{}""#, num(line.stroke_width))?;
    if let Some(dash) = line.stroke_style.dash_array(line.stroke_width) {
        write!(out, r#" stroke-dasharray="{dash}""#)?;
    }
    out.push_str("/>\n");
    Ok(())
}

fn write_rect(out: &mut String, rect: &RectPrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
        num(rect.x),
        num(rect.y),
        num(rect.width),
        num(rect.height)
    )?;
    if rect.corner_radius > 0.0 {
        let radius = rect
            .corner_radius
            .min(rect.width * 0.5)
            .min(rect.height * 0.5);
        write!(out, r#" rx="{}""#, num(radius))?;
    }
    write_paint(out, "fill", Some(rect.fill_color))?;
    if rect.border_width > 0.0 {
        write_paint(out, "stroke", Some(rect.border_color))?;
        write!(out, r#" stroke-width="{}""#, num(rect.border_width))?;
    }
    out.push_str("/>\n");
    Ok(())
}

fn write_circle(out: &mut String, circle: &CirclePrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<circle cx="{}" cy="{}" r="{}""#,
        num(circle.cx),
        num(circle.cy),
        num(circle.radius)
    )?;
    write_paint(out, "fill", Some(circle.fill_color))?;
    if circle.border_width > 0.0 {
        write_paint(out, "stroke", Some(circle.border_color))?;
        write!(out, r#" stroke-width="{}""#, num(circle.border_width))?;
    }
    out.push_str("/>\n");
    Ok(())
}

fn path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for command in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        match *command {
            PathCommand::MoveTo(x, y) => {
                let _ = write!(d, "M{},{}", num(x), num(y));
            }
            PathCommand::LineTo(x, y) => {
                let _ = write!(d, "L{},{}", num(x), num(y));
            }
            PathCommand::ArcTo {
                radius,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let _ = write!(
                    d,
                    "A{r},{r} 0 {} {} {},{}",
                    u8::from(large_arc),
                    u8::from(sweep),
                    num(x),
                    num(y),
                    r = num(radius)
                );
            }
            PathCommand::Close => d.push('Z'),
        }
    }
    d
}

fn write_path(out: &mut String, path: &PathPrimitive) -> std::fmt::Result {
    write!(out, r#"<path d="{}""#, path_data(&path.commands))?;
    write_paint(out, "fill", path.fill)?;
    if let Some(stroke) = path.stroke {
        write_paint(out, "stroke", Some(stroke))?;
        write!(out, r#" stroke-width="{}""#, num(path.stroke_width))?;
        if let Some(dash) = path.stroke_style.dash_array(path.stroke_width) {
            write!(out, r#" stroke-dasharray="{dash}""#)?;
        }
        out.push_str(r#" stroke-linejoin="round" stroke-linecap="round""#);
    }
    out.push_str("/>\n");
    Ok(())
}

fn write_text(out: &mut String, text: &TextPrimitive) -> std::fmt::Result {
    write!(
        out,
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}""#,
        num(text.x),
        num(text.y),
        escape_xml(&text.font_family),
        num(text.font_size_px)
    )?;
    if text.font_weight != FontWeight::NORMAL {
        write!(
            out,
            r#" font-weight="{}""#,
            escape_xml(&text.font_weight.to_string())
        )?;
    }
    out.push_str(match text.h_align {
        TextHAlign::Left => r#" text-anchor="start""#,
        TextHAlign::Center => r#" text-anchor="middle""#,
        TextHAlign::Right => r#" text-anchor="end""#,
    });
    match text.v_align {
        TextVAlign::Baseline => {}
        TextVAlign::Middle => out.push_str(r#" dominant-baseline="central""#),
        TextVAlign::Top => out.push_str(r#" dominant-baseline="hanging""#),
    }
    if text.rotation_deg != 0.0 {
        write!(
            out,
            r#" transform="rotate({} {} {})""#,
            num(text.rotation_deg),
            num(text.x),
            num(text.y)
        )?;
    }
    write_paint(out, "fill", Some(text.color))?;
    write!(out, ">{}</text>", escape_xml(&text.text))?;
    out.push('\n');
    Ok(())
}

fn write_image(out: &mut String, image: &ImagePrimitive) -> std::fmt::Result {
    writeln!(
        out,
        r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice"/>"#,
        escape_xml(&image.href),
        num(image.x),
        num(image.y),
        num(image.width),
        num(image.height)
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_trimmed() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(0.333_333), "0.33");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn error_markup_escapes_message() {
        assert_eq!(
            error_markup("x < y & \"z\""),
            r#"<div class="chart-error" role="alert">x &lt; y &amp; &quot;z&quot;</div>"#
        );
    }
}
