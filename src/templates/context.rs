use crate::api::validation::validate_margins;
use crate::api::{
    ChartEngineConfig, ChartPayload, ColumnRole, ColumnSpec, Row, Typography, Variables,
};
use crate::core::{
    Margins, OrdinalColorScale, TextMeasurer, Viewport, format_number, format_with_unit,
};
use crate::error::ChartResult;
use crate::render::{Color, LineStrokeStyle};

/// Colors resolved from the payload with engine defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Unassigned categorical scale; clone it per chart.
    pub palette: OrdinalColorScale,
    pub text: Color,
    pub other: Color,
    pub background: Option<Color>,
}

impl Theme {
    pub fn resolve(payload: &ChartPayload, config: &ChartEngineConfig) -> ChartResult<Self> {
        let colors = &payload.colors;
        let palette = if colors.available_colors.is_empty() {
            &config.palette
        } else {
            &colors.available_colors
        };
        let palette = OrdinalColorScale::from_css(palette)?;
        let text = Color::parse_css(colors.text_color.as_deref().unwrap_or(&config.text_color))?;
        let other = Color::parse_css(colors.other.as_deref().unwrap_or(&config.other_color))?;
        let background = colors
            .background_color
            .as_deref()
            .or(config.background_color.as_deref())
            .map(Color::parse_css)
            .transpose()?
            .filter(|color| !color.is_transparent());
        Ok(Self {
            palette,
            text,
            other,
            background,
        })
    }
}

/// Everything a template reads while building a frame.
pub struct TemplateContext<'a> {
    pub payload: &'a ChartPayload,
    pub measurer: &'a dyn TextMeasurer,
    pub theme: Theme,
    pub viewport: Viewport,
    pub margins: Margins,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        payload: &'a ChartPayload,
        config: &ChartEngineConfig,
        measurer: &'a dyn TextMeasurer,
    ) -> ChartResult<Self> {
        let vars = &payload.variables;
        let viewport = Viewport::from_dimensions(
            vars.number_or("width", config.width),
            vars.number_or("height", config.height),
        )?;
        let margins = validate_margins(Margins {
            top: vars.number_or("margin_top", config.margins.top),
            right: vars.number_or("margin_right", config.margins.right),
            bottom: vars.number_or("margin_bottom", config.margins.bottom),
            left: vars.number_or("margin_left", config.margins.left),
        })?;
        Ok(Self {
            payload,
            measurer,
            theme: Theme::resolve(payload, config)?,
            viewport,
            margins,
        })
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.payload.variables
    }

    #[must_use]
    pub fn typography(&self) -> &Typography {
        &self.payload.typography
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.payload.rows()
    }

    #[must_use]
    pub fn column(&self, role: ColumnRole) -> Option<&ColumnSpec> {
        self.payload.column(role)
    }

    pub fn require(&self, template: &'static str, role: ColumnRole) -> ChartResult<&ColumnSpec> {
        self.payload.require_column(template, role)
    }

    #[must_use]
    pub fn decimals(&self) -> Option<u32> {
        self.variables().decimals()
    }

    /// Number formatted with the payload's `decimals` and the column unit.
    #[must_use]
    pub fn format_value(&self, value: f64, unit: Option<&str>) -> String {
        format_with_unit(&format_number(value, self.decimals()), unit)
    }

    #[must_use]
    pub fn show_gridlines(&self) -> bool {
        self.variables().flag_or("show_gridlines", true)
    }

    /// Dash pattern for gridlines from `gridline_style`; solid when unset or unknown.
    #[must_use]
    pub fn gridline_style(&self) -> LineStrokeStyle {
        self.variables()
            .text("gridline_style")
            .and_then(|name| LineStrokeStyle::from_name(&name))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn color_scale(&self) -> OrdinalColorScale {
        self.theme.palette.clone()
    }

    /// Column that selects categorical colors: `colors.field` when set,
    /// otherwise the first of `fallbacks` the payload declares.
    #[must_use]
    pub fn color_column(&self, fallbacks: &[ColumnRole]) -> Option<ColumnSpec> {
        if let Some(field) = &self.payload.colors.field {
            return Some(
                self.payload
                    .column_named(field)
                    .cloned()
                    .unwrap_or_else(|| ColumnSpec::new(ColumnRole::Unknown, field.clone())),
            );
        }
        fallbacks
            .iter()
            .find_map(|role| self.column(*role))
            .cloned()
    }

    /// Column holding per-row image URLs, when images are configured.
    #[must_use]
    pub fn image_column(&self) -> Option<ColumnSpec> {
        self.payload
            .images
            .field
            .as_ref()
            .map(|field| ColumnSpec::new(ColumnRole::Unknown, field.clone()))
    }
}
