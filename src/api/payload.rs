use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{FontSpec, parse_number, value_text};
use crate::error::{ChartError, ChartResult};

/// One data row, keyed by column name in payload order.
pub type Row = IndexMap<String, Value>;

/// Semantic role a column plays in a chart encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    X,
    Y,
    Group,
    Label,
    Value,
    Size,
    Start,
    End,
    #[serde(other)]
    Unknown,
}

impl ColumnRole {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Group => "group",
            Self::Label => "label",
            Self::Value => "value",
            Self::Size => "size",
            Self::Start => "start",
            Self::End => "end",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub role: ColumnRole,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(role: ColumnRole, name: impl Into<String>) -> Self {
        Self {
            role,
            name: name.into(),
            unit: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Unit with blank values treated as absent.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Numeric reading of this column's cell in `row`.
    #[must_use]
    pub fn number(&self, row: &Row) -> Option<f64> {
        row.get(&self.name).and_then(parse_number)
    }

    /// Trimmed, non-empty text of this column's cell in `row`.
    #[must_use]
    pub fn text(&self, row: &Row) -> Option<String> {
        row.get(&self.name)
            .and_then(value_text)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSection {
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// Free-form template variables with loosely typed accessors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(IndexMap<String, Value>);

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(parse_number)
    }

    #[must_use]
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    /// Trimmed, non-empty text.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(value_text)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }

    /// Reads booleans, `"true"`/`"false"`/`"yes"`/`"no"` strings and 0/1 numbers.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => number.as_f64().map(|v| v != 0.0),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn flag_or(&self, name: &str, default: bool) -> bool {
        self.flag(name).unwrap_or(default)
    }

    /// `decimals` as a digit count, ignoring negative or non-integral values.
    #[must_use]
    pub fn decimals(&self) -> Option<u32> {
        self.number("decimals")
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= 12.0)
            .map(|v| v as u32)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    #[serde(default = "FontSpec::title")]
    pub title: FontSpec,
    #[serde(default = "FontSpec::label")]
    pub label: FontSpec,
    #[serde(default = "FontSpec::annotation")]
    pub annotation: FontSpec,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title: FontSpec::title(),
            label: FontSpec::label(),
            annotation: FontSpec::annotation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorSettings {
    /// Column whose values select the categorical color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Axis, gridline and range-line color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Column holding an image URL per row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Everything a template needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub variables: Variables,
    #[serde(default)]
    pub typography: Typography,
    #[serde(default)]
    pub colors: ColorSettings,
    #[serde(default)]
    pub images: ImageSettings,
}

impl ChartPayload {
    #[must_use]
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Row>) -> Self {
        Self {
            data: DataSection {
                data: rows,
                columns,
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.data.data
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.data.columns
    }

    /// First column declared with `role`.
    #[must_use]
    pub fn column(&self, role: ColumnRole) -> Option<&ColumnSpec> {
        self.data.columns.iter().find(|column| column.role == role)
    }

    #[must_use]
    pub fn column_named(&self, name: &str) -> Option<&ColumnSpec> {
        self.data.columns.iter().find(|column| column.name == name)
    }

    pub fn require_column(
        &self,
        template: &'static str,
        role: ColumnRole,
    ) -> ChartResult<&ColumnSpec> {
        self.column(role)
            .ok_or(ChartError::MissingRole { template, role })
    }
}
