use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::templates::TemplateKind;

use super::ChartPayload;

pub const CHART_REQUEST_JSON_SCHEMA_V1: u32 = 1;

/// Self-describing render request: the template plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequestJsonContractV1 {
    pub schema_version: u32,
    pub template: TemplateKind,
    pub payload: ChartPayload,
}

impl ChartRequestJsonContractV1 {
    #[must_use]
    pub fn new(template: TemplateKind, payload: ChartPayload) -> Self {
        Self {
            schema_version: CHART_REQUEST_JSON_SCHEMA_V1,
            template,
            payload,
        }
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart request contract v1: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let request: Self = serde_json::from_str(input)?;
        if request.schema_version != CHART_REQUEST_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported chart request schema version: {}",
                request.schema_version
            )));
        }
        Ok(request)
    }
}

impl ChartPayload {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> ChartResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart payload: {e}"))
        })
    }

    /// Accepts either a bare payload or a v1 request envelope.
    ///
    /// Returns the template named by the envelope, if any.
    pub fn from_json_compat_str(input: &str) -> ChartResult<(Option<TemplateKind>, Self)> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        if value.get("schema_version").is_some() && value.get("payload").is_some() {
            let request = ChartRequestJsonContractV1::from_json_str(input)?;
            return Ok((Some(request.template), request.payload));
        }
        Ok((None, Self::from_json_value(value)?))
    }
}
