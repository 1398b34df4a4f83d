use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, Color, ImagePrimitive, LayerKind, LinePrimitive, PathPrimitive, Primitive,
    RectPrimitive, TextPrimitive,
};

/// Primitives painted together in one layer, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: LayerKind,
    pub primitives: Vec<Primitive>,
}

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub background: Option<Color>,
    pub layers: Vec<LayerPrimitives>,
}

macro_rules! typed_iter {
    ($all:ident, $in_layer:ident, $variant:ident, $ty:ty) => {
        pub fn $all(&self) -> impl Iterator<Item = &$ty> + '_ {
            self.primitives().filter_map(|primitive| match primitive {
                Primitive::$variant(inner) => Some(inner),
                _ => None,
            })
        }

        pub fn $in_layer(&self, kind: LayerKind) -> impl Iterator<Item = &$ty> + '_ {
            self.layer(kind).iter().filter_map(|primitive| match primitive {
                Primitive::$variant(inner) => Some(inner),
                _ => None,
            })
        }
    };
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: None,
            layers: LayerKind::CANONICAL
                .into_iter()
                .map(|kind| LayerPrimitives {
                    kind,
                    primitives: Vec::new(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    #[must_use]
    pub fn with(mut self, kind: LayerKind, primitive: impl Into<Primitive>) -> Self {
        self.push(kind, primitive);
        self
    }

    pub fn push(&mut self, kind: LayerKind, primitive: impl Into<Primitive>) {
        let primitive = primitive.into();
        match self.layers.iter_mut().find(|layer| layer.kind == kind) {
            Some(layer) => layer.primitives.push(primitive),
            None => self.layers.push(LayerPrimitives {
                kind,
                primitives: vec![primitive],
            }),
        }
    }

    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> &[Primitive] {
        self.layers
            .iter()
            .find(|layer| layer.kind == kind)
            .map(|layer| layer.primitives.as_slice())
            .unwrap_or(&[])
    }

    /// All primitives in paint order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> + '_ {
        self.layers.iter().flat_map(|layer| layer.primitives.iter())
    }

    typed_iter!(lines, lines_in, Line, LinePrimitive);
    typed_iter!(rects, rects_in, Rect, RectPrimitive);
    typed_iter!(circles, circles_in, Circle, CirclePrimitive);
    typed_iter!(paths, paths_in, Path, PathPrimitive);
    typed_iter!(texts, texts_in, Text, TextPrimitive);
    typed_iter!(images, images_in, Image, ImagePrimitive);

    /// Whether any text primitive in any layer reads exactly `text`.
    #[must_use]
    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().any(|primitive| primitive.text == text)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if let Some(background) = self.background {
            background.validate()?;
        }
        for primitive in self.primitives() {
            primitive.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.primitives.is_empty())
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.primitives.len()).sum()
    }
}
