use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Builds a viewport from loosely typed payload dimensions.
    pub fn from_dimensions(width: f64, height: f64) -> ChartResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 1.0 || height < 1.0 {
            return Err(ChartError::InvalidViewport {
                width: clamp_dimension(width),
                height: clamp_dimension(height),
            });
        }
        Ok(Self::new(clamp_dimension(width), clamp_dimension(height)))
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[must_use]
    pub fn area(self) -> PlotArea {
        PlotArea::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

fn clamp_dimension(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Outer spacing around the drawable area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(16.0)
    }
}

/// Axis-aligned rectangle in pixel space that marks are laid out into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn center_y(self) -> f64 {
        self.y + self.height / 2.0
    }

    #[must_use]
    pub fn is_usable(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Shrinks the area by the given margins.
    #[must_use]
    pub fn inset(self, margins: Margins) -> Self {
        Self::new(
            self.x + margins.left,
            self.y + margins.top,
            self.width - margins.left - margins.right,
            self.height - margins.top - margins.bottom,
        )
    }

    /// Removes `amount` pixels from the top edge.
    #[must_use]
    pub fn trim_top(self, amount: f64) -> Self {
        Self::new(self.x, self.y + amount, self.width, self.height - amount)
    }

    #[must_use]
    pub fn trim_bottom(self, amount: f64) -> Self {
        Self::new(self.x, self.y, self.width, self.height - amount)
    }

    #[must_use]
    pub fn trim_left(self, amount: f64) -> Self {
        Self::new(self.x + amount, self.y, self.width - amount, self.height)
    }

    #[must_use]
    pub fn trim_right(self, amount: f64) -> Self {
        Self::new(self.x, self.y, self.width - amount, self.height)
    }

    pub fn ensure_usable(self, template: &str) -> ChartResult<Self> {
        if self.is_usable() {
            Ok(self)
        } else {
            Err(ChartError::InvalidData(format!(
                "{template}: chart area is too small for the requested layout"
            )))
        }
    }

    #[must_use]
    pub fn bounds(self) -> crate::core::Bounds {
        crate::core::Bounds::new(self.x, self.y, self.right(), self.bottom())
    }
}
