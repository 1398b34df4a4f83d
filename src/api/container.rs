use tracing::error;

use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, SvgRenderer, error_markup};
use crate::templates::TemplateKind;

use super::{ChartEngine, ChartPayload};

/// Host element a chart is drawn into.
///
/// `content` mirrors the element's inner markup: the SVG after a successful
/// render, the inline error `<div>` after a failed one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartContainer {
    selector: String,
    content: String,
}

impl ChartContainer {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            content: String::new(),
        }
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.content.starts_with(r#"<div class="chart-error""#)
    }

    pub fn clear(&mut self) {
        self.content.clear();
    }

    /// Logs `err` and replaces the contents with the inline error `<div>`.
    ///
    /// Hosts call this for failures that happen before a template runs,
    /// such as an unreadable request.
    pub fn report_failure(&mut self, template: &str, err: &ChartError) {
        error!(
            template,
            container = %self.selector,
            error = %err,
            "chart could not be drawn"
        );
        self.content = error_markup(&err.to_string());
    }
}

/// Successful result of [`make_chart`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub svg: String,
    pub frame: RenderFrame,
}

impl ChartEngine<SvgRenderer> {
    /// Draws a chart into `container`.
    ///
    /// On failure the error is logged, the container shows an inline error
    /// `<div>` and `None` is returned.
    pub fn make_chart(
        &mut self,
        container: &mut ChartContainer,
        kind: TemplateKind,
        payload: &ChartPayload,
    ) -> Option<RenderedChart> {
        let result = self.render_chart(kind, payload);
        settle(container, kind.name(), result)
    }

    /// [`ChartEngine::make_chart`] for raw JSON payload text.
    pub fn make_chart_from_json(
        &mut self,
        container: &mut ChartContainer,
        kind: TemplateKind,
        json: &str,
    ) -> Option<RenderedChart> {
        let result =
            ChartPayload::from_json_str(json).and_then(|payload| self.render_chart(kind, &payload));
        settle(container, kind.name(), result)
    }

    fn render_chart(
        &mut self,
        kind: TemplateKind,
        payload: &ChartPayload,
    ) -> ChartResult<RenderedChart> {
        let (svg, frame) = self.render_svg_frame(kind, payload)?;
        Ok(RenderedChart { svg, frame })
    }
}

fn settle(
    container: &mut ChartContainer,
    template: &str,
    result: ChartResult<RenderedChart>,
) -> Option<RenderedChart> {
    match result {
        Ok(chart) => {
            container.content.clone_from(&chart.svg);
            Some(chart)
        }
        Err(err) => {
            container.report_failure(template, &err);
            None
        }
    }
}

/// Draws `kind` into `container` with a default SVG engine.
pub fn make_chart(
    container: &mut ChartContainer,
    kind: TemplateKind,
    payload: &ChartPayload,
) -> Option<RenderedChart> {
    match ChartEngine::<SvgRenderer>::svg() {
        Ok(mut engine) => engine.make_chart(container, kind, payload),
        Err(err) => settle(container, kind.name(), Err(err)),
    }
}

/// [`make_chart`] for raw JSON payload text; parse errors follow the same
/// error-div contract.
pub fn make_chart_from_json(
    container: &mut ChartContainer,
    kind: TemplateKind,
    json: &str,
) -> Option<RenderedChart> {
    match ChartEngine::<SvgRenderer>::svg() {
        Ok(mut engine) => engine.make_chart_from_json(container, kind, json),
        Err(err) => settle(container, kind.name(), Err(err)),
    }
}
