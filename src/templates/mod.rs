use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ColumnRole;
use crate::error::{ChartError, ChartResult};
use crate::render::RenderFrame;

mod area;
mod bar;
mod column;
mod common;
mod context;
mod dot_plot;
mod grouped_column;
mod heatmap;
mod line;
mod lollipop;
mod pie;
mod proportional_circles;
mod proportional_triangles;
mod scatter;
mod slope;
mod stacked_bar;

pub use context::{TemplateContext, Theme};

/// Contract implemented by every chart template.
pub trait ChartTemplate: Sync {
    fn kind(&self) -> TemplateKind;

    /// Roles that must be declared in `data.columns`.
    fn required_roles(&self) -> &'static [ColumnRole];

    /// Usable rows needed after parsing.
    fn min_rows(&self) -> usize {
        1
    }

    fn build(&self, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Bar,
    Column,
    GroupedColumn,
    StackedBar,
    Scatter,
    Line,
    Area,
    Pie,
    ProportionalCircles,
    ProportionalTriangles,
    DotPlot,
    Slope,
    Lollipop,
    Heatmap,
}

impl TemplateKind {
    pub const ALL: [Self; 14] = [
        Self::Bar,
        Self::Column,
        Self::GroupedColumn,
        Self::StackedBar,
        Self::Scatter,
        Self::Line,
        Self::Area,
        Self::Pie,
        Self::ProportionalCircles,
        Self::ProportionalTriangles,
        Self::DotPlot,
        Self::Slope,
        Self::Lollipop,
        Self::Heatmap,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Column => "column",
            Self::GroupedColumn => "grouped_column",
            Self::StackedBar => "stacked_bar",
            Self::Scatter => "scatter",
            Self::Line => "line",
            Self::Area => "area",
            Self::Pie => "pie",
            Self::ProportionalCircles => "proportional_circles",
            Self::ProportionalTriangles => "proportional_triangles",
            Self::DotPlot => "dot_plot",
            Self::Slope => "slope",
            Self::Lollipop => "lollipop",
            Self::Heatmap => "heatmap",
        }
    }

    #[must_use]
    pub fn template(self) -> &'static dyn ChartTemplate {
        match self {
            Self::Bar => &bar::BarTemplate,
            Self::Column => &column::ColumnTemplate,
            Self::GroupedColumn => &grouped_column::GroupedColumnTemplate,
            Self::StackedBar => &stacked_bar::StackedBarTemplate,
            Self::Scatter => &scatter::ScatterTemplate,
            Self::Line => &line::LineTemplate,
            Self::Area => &area::AreaTemplate,
            Self::Pie => &pie::PieTemplate,
            Self::ProportionalCircles => &proportional_circles::ProportionalCirclesTemplate,
            Self::ProportionalTriangles => &proportional_triangles::ProportionalTrianglesTemplate,
            Self::DotPlot => &dot_plot::DotPlotTemplate,
            Self::Slope => &slope::SlopeTemplate,
            Self::Lollipop => &lollipop::LollipopTemplate,
            Self::Heatmap => &heatmap::HeatmapTemplate,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateKind {
    type Err = ChartError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| ChartError::UnknownTemplate(input.to_owned()))
    }
}

/// Checks declared roles, then runs the template.
pub fn build_frame(kind: TemplateKind, ctx: &TemplateContext<'_>) -> ChartResult<RenderFrame> {
    let template = kind.template();
    for &role in template.required_roles() {
        ctx.require(kind.name(), role)?;
    }
    if ctx.rows().is_empty() {
        return Err(ChartError::InsufficientData {
            template: kind.name(),
            required: template.min_rows(),
            found: 0,
        });
    }
    let frame = template.build(ctx)?;
    debug!(
        template = kind.name(),
        primitives = frame.primitive_count(),
        "template frame built"
    );
    Ok(frame)
}
