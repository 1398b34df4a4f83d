//! chart-templates: self-contained chart templates rendered to SVG.
//!
//! Every template takes a JSON payload (rows, role-mapped columns, layout
//! variables, typography, colors, images), checks its own inputs, lays out
//! its own scales and emits a layered [`render::RenderFrame`]. Frames are
//! serialized by a [`render::Renderer`]; [`render::SvgRenderer`] produces
//! standalone SVG markup.
//!
//! [`make_chart`] keeps the host contract of the original templates: the
//! container receives the SVG, or an inline error `<div>` when the chart
//! cannot be drawn, in which case `None` is returned.

pub mod api;
pub mod core;
pub mod error;
pub mod layout;
pub mod render;
pub mod telemetry;
pub mod templates;

pub use api::{
    ChartContainer, ChartEngine, ChartEngineConfig, ChartPayload, RenderedChart, make_chart,
    make_chart_from_json,
};
pub use error::{ChartError, ChartResult};
pub use templates::TemplateKind;
