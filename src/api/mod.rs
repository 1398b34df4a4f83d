mod container;
mod engine;
mod engine_config;
mod json_contract;
mod payload;
pub(crate) mod validation;

pub use container::{ChartContainer, RenderedChart, make_chart, make_chart_from_json};
pub use engine::ChartEngine;
pub use engine_config::ChartEngineConfig;
pub use json_contract::{CHART_REQUEST_JSON_SCHEMA_V1, ChartRequestJsonContractV1};
pub use payload::{
    ChartPayload, ColorSettings, ColumnRole, ColumnSpec, DataSection, ImageSettings, Row,
    Typography, Variables,
};
