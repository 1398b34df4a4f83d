use tracing::debug;

use crate::core::{HeuristicTextMeasurer, TextMeasurer};
use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer, SvgRenderer};
use crate::templates::{self, TemplateContext, TemplateKind};

use super::validation::{lint_payload, validate_engine_config};
use super::{ChartEngineConfig, ChartPayload};

/// Facade that turns payloads into frames and hands them to a renderer.
///
/// The engine keeps no per-chart state: every call builds its frame from the
/// payload alone, so one engine can serve any number of charts.
pub struct ChartEngine<R: Renderer> {
    renderer: R,
    config: ChartEngineConfig,
    measurer: Box<dyn TextMeasurer>,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        Ok(Self {
            renderer,
            config: validate_engine_config(config)?,
            measurer: Box::new(HeuristicTextMeasurer::default()),
        })
    }

    /// Replaces the heuristic measurer, e.g. with one backed by real font metrics.
    #[must_use]
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    /// Lays out one chart without rendering it.
    pub fn build_frame(&self, kind: TemplateKind, payload: &ChartPayload) -> ChartResult<RenderFrame> {
        lint_payload(payload);
        let ctx = TemplateContext::new(payload, &self.config, self.measurer.as_ref())?;
        templates::build_frame(kind, &ctx)
    }

    /// Builds the frame and passes it to the renderer.
    pub fn render(&mut self, kind: TemplateKind, payload: &ChartPayload) -> ChartResult<RenderFrame> {
        let frame = self.build_frame(kind, payload)?;
        self.renderer.render(&frame)?;
        debug!(template = %kind, primitives = frame.primitive_count(), "chart rendered");
        Ok(frame)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

impl ChartEngine<SvgRenderer> {
    /// Engine with the SVG backend and default settings.
    pub fn svg() -> ChartResult<Self> {
        Self::new(SvgRenderer::new(), ChartEngineConfig::default())
    }

    /// Renders one chart to SVG markup.
    ///
    /// The `<svg>` root carries `class="chart chart-<template>"`.
    pub fn render_svg(&mut self, kind: TemplateKind, payload: &ChartPayload) -> ChartResult<String> {
        self.render_svg_frame(kind, payload).map(|(svg, _)| svg)
    }

    pub(super) fn render_svg_frame(
        &mut self,
        kind: TemplateKind,
        payload: &ChartPayload,
    ) -> ChartResult<(String, RenderFrame)> {
        self.renderer
            .set_root_class(Some(format!("chart chart-{}", kind.name().replace('_', "-"))));
        let frame = self.render(kind, payload)?;
        let svg = self.renderer.take_svg().ok_or_else(|| {
            ChartError::InvalidData("svg renderer produced no markup".to_owned())
        })?;
        Ok((svg, frame))
    }
}
