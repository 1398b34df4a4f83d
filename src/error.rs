use thiserror::Error;

use crate::api::ColumnRole;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("{template}: missing required column with role `{role}`")]
    MissingRole {
        template: &'static str,
        role: ColumnRole,
    },

    #[error("{template}: needs at least {required} usable data row(s), found {found}")]
    InsufficientData {
        template: &'static str,
        required: usize,
        found: usize,
    },

    #[error("invalid color: `{0}`")]
    InvalidColor(String),

    #[error("unknown chart template: `{0}`")]
    UnknownTemplate(String),

    #[error("invalid chart payload: {0}")]
    Payload(#[from] serde_json::Error),
}
