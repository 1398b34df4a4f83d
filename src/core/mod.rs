pub mod color_scale;
pub mod format;
pub mod geometry;
pub mod scale;
pub mod text;
pub mod ticks;
pub mod types;

pub use color_scale::{DEFAULT_PALETTE, OrdinalColorScale};
pub use format::{
    datetime_to_unix_seconds, format_number, format_with_unit, parse_number,
    parse_temporal, value_text,
};
pub use geometry::Bounds;
pub use scale::{BandScale, LinearScale, SqrtScale};
pub use text::{
    FontSpec, FontWeight, HeuristicTextMeasurer, TextExtent, TextMeasurer, truncate_to_width,
};
pub use ticks::{TemporalTick, nice_step, nice_ticks, temporal_ticks, tick_target_count};
pub use types::{Margins, PlotArea, Viewport};
