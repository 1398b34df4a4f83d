use serde::{Deserialize, Serialize};

/// Drawing layers of a chart, listed bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Background,
    Grid,
    Axis,
    Marks,
    Labels,
    Annotation,
}

impl LayerKind {
    /// Canonical paint order.
    pub const CANONICAL: [Self; 6] = [
        Self::Background,
        Self::Grid,
        Self::Axis,
        Self::Marks,
        Self::Labels,
        Self::Annotation,
    ];

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Background => "layer-background",
            Self::Grid => "layer-grid",
            Self::Axis => "layer-axis",
            Self::Marks => "layer-marks",
            Self::Labels => "layer-labels",
            Self::Annotation => "layer-annotation",
        }
    }
}
