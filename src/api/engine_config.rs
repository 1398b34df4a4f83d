use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_PALETTE, Margins};

/// Engine-wide defaults applied wherever a payload leaves a setting out.
///
/// This type is serializable so host applications can persist a house style
/// next to their payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_other_color")]
    pub other_color: String,
    #[serde(default)]
    pub background_color: Option<String>,
}

impl Default for ChartEngineConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            margins: Margins::default(),
            palette: default_palette(),
            text_color: default_text_color(),
            other_color: default_other_color(),
            background_color: None,
        }
    }
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chart size used when a payload has no `width`/`height`.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_palette<S: Into<String>>(mut self, palette: impl IntoIterator<Item = S>) -> Self {
        self.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = color.into();
        self
    }

    #[must_use]
    pub fn with_other_color(mut self, color: impl Into<String>) -> Self {
        self.other_color = color.into();
        self
    }

    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

fn default_width() -> f64 {
    640.0
}

fn default_height() -> f64 {
    400.0
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect()
}

fn default_text_color() -> String {
    "#333333".to_owned()
}

fn default_other_color() -> String {
    "#cccccc".to_owned()
}
