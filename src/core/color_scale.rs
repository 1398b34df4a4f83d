use indexmap::IndexMap;

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Categorical palette used when a payload lists no `available_colors`.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

/// Assigns palette colors to category keys in first-appearance order.
///
/// Keys beyond the palette length cycle back to the first color.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColorScale {
    palette: Vec<Color>,
    assigned: IndexMap<String, Color>,
}

impl OrdinalColorScale {
    pub fn new(palette: Vec<Color>) -> ChartResult<Self> {
        if palette.is_empty() {
            return Err(ChartError::InvalidData(
                "color palette must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            palette,
            assigned: IndexMap::new(),
        })
    }

    /// Parses CSS color strings; an empty list falls back to [`DEFAULT_PALETTE`].
    pub fn from_css<S: AsRef<str>>(colors: &[S]) -> ChartResult<Self> {
        let palette = if colors.is_empty() {
            DEFAULT_PALETTE
                .iter()
                .map(|css| Color::parse_css(css))
                .collect::<ChartResult<Vec<_>>>()?
        } else {
            colors
                .iter()
                .map(|css| Color::parse_css(css.as_ref()))
                .collect::<ChartResult<Vec<_>>>()?
        };
        Self::new(palette)
    }

    pub fn color_for(&mut self, key: &str) -> Color {
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }
        let color = self.palette[self.assigned.len() % self.palette.len()];
        self.assigned.insert(key.to_owned(), color);
        color
    }

    /// Pre-assigns keys so legend order matches data order.
    pub fn assign_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            self.color_for(key);
        }
    }

    #[must_use]
    pub fn first(&self) -> Color {
        self.palette[0]
    }

    #[must_use]
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// Assigned `(key, color)` pairs in assignment order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Color)> + '_ {
        self.assigned.iter().map(|(key, color)| (key.as_str(), *color))
    }
}
