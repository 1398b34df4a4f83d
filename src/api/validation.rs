use tracing::warn;

use crate::core::Margins;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

use super::{ChartEngineConfig, ChartPayload, ColumnRole};

pub(super) fn validate_engine_config(config: ChartEngineConfig) -> ChartResult<ChartEngineConfig> {
    for (name, value) in [("width", config.width), ("height", config.height)] {
        if !value.is_finite() || value < 1.0 {
            return Err(ChartError::InvalidData(format!(
                "default chart {name} must be finite and >= 1"
            )));
        }
    }
    validate_margins(config.margins)?;
    if config.palette.is_empty() {
        return Err(ChartError::InvalidData(
            "default palette must not be empty".to_owned(),
        ));
    }
    for css in &config.palette {
        Color::parse_css(css)?;
    }
    Color::parse_css(&config.text_color)?;
    Color::parse_css(&config.other_color)?;
    if let Some(background) = &config.background_color {
        Color::parse_css(background)?;
    }
    Ok(config)
}

pub(crate) fn validate_margins(margins: Margins) -> ChartResult<Margins> {
    for (side, value) in [
        ("top", margins.top),
        ("right", margins.right),
        ("bottom", margins.bottom),
        ("left", margins.left),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "margin_{side} must be finite and >= 0"
            )));
        }
    }
    Ok(margins)
}

/// Logs payload oddities that do not stop rendering.
pub(super) fn lint_payload(payload: &ChartPayload) {
    for column in payload.columns() {
        if column.role == ColumnRole::Unknown {
            warn!(column = %column.name, "ignoring column with unknown role");
        }
    }
    for (i, column) in payload.columns().iter().enumerate() {
        let duplicate = payload.columns()[..i]
            .iter()
            .any(|earlier| earlier.role == column.role && column.role != ColumnRole::Unknown);
        if duplicate {
            warn!(
                column = %column.name,
                role = %column.role,
                "role declared more than once; the first column wins"
            );
        }
    }
    if let Some(field) = &payload.colors.field {
        let known = payload.columns().iter().any(|column| &column.name == field)
            || payload.rows().iter().any(|row| row.contains_key(field));
        if !known {
            warn!(field = %field, "colors.field does not name a column");
        }
    }
}
