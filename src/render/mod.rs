mod frame;
mod layer_stack;
mod null_renderer;
mod primitives;
mod svg_renderer;

pub use frame::{LayerPrimitives, RenderFrame};
pub use layer_stack::LayerKind;
pub use null_renderer::NullRenderer;
pub use primitives::{
    CirclePrimitive, Color, ImagePrimitive, LinePrimitive, LineStrokeStyle, PathCommand,
    PathPrimitive, Primitive, RectPrimitive, TextHAlign, TextPrimitive, TextVAlign,
};
pub use svg_renderer::{SvgRenderStats, SvgRenderer, error_markup};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from template layout logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
