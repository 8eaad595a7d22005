use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const REQUIRED_FIELDS: &[&str] = &[
    "station_id",
    "recommended_volume",
    "recommended_unit",
    "suggested_delivery_time",
    "alerts",
    "fallback",
];

pub const BALANCED_FALLBACK: &str = "Recommendation based on balanced optimization.";

/// Response body of `POST /api/allocate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub station_id: String,
    pub recommended_volume: u64,
    pub recommended_unit: String,
    pub suggested_delivery_time: Option<String>,
    pub alerts: Vec<String>,
    pub fallback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub problem: FieldProblem,
}

impl FieldError {
    fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            problem: FieldProblem::Missing,
        }
    }

    fn wrong_type(field: &str, expected: &'static str, found: &Value) -> Self {
        Self {
            field: field.to_string(),
            problem: FieldProblem::WrongType {
                expected,
                found: json_type_name(found),
            },
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "missing required field: {}", self.field),
            FieldProblem::WrongType { expected, found } => {
                write!(f, "{} should be {expected}, found {found}", self.field)
            }
        }
    }
}

/// Typed, field-by-field access to a raw response body.
///
/// Every accessor fails on its own, so one bad field never hides the others.
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'a> {
    body: &'a Value,
}

impl<'a> ResponseView<'a> {
    pub fn new(body: &'a Value) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &'a Value {
        self.body
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.body.get(name).is_some()
    }

    fn get(&self, name: &str) -> Result<&'a Value, FieldError> {
        self.body.get(name).ok_or_else(|| FieldError::missing(name))
    }

    fn string(&self, name: &str) -> Result<&'a str, FieldError> {
        let value = self.get(name)?;
        value
            .as_str()
            .ok_or_else(|| FieldError::wrong_type(name, "a string", value))
    }

    pub fn station_id(&self) -> Result<&'a str, FieldError> {
        self.string("station_id")
    }

    /// Integer volume. Values beyond `i64` saturate so bound checks still fail.
    pub fn recommended_volume(&self) -> Result<i64, FieldError> {
        let value = self.get("recommended_volume")?;
        value
            .as_i64()
            .or_else(|| value.as_u64().map(|_| i64::MAX))
            .ok_or_else(|| FieldError::wrong_type("recommended_volume", "an integer", value))
    }

    pub fn recommended_unit(&self) -> Result<&'a str, FieldError> {
        self.string("recommended_unit")
    }

    /// `Ok(None)` when the field is present and null.
    pub fn suggested_delivery_time(&self) -> Result<Option<&'a str>, FieldError> {
        let value = self.get("suggested_delivery_time")?;
        match value {
            Value::Null => Ok(None),
            Value::String(time) => Ok(Some(time.as_str())),
            other => Err(FieldError::wrong_type(
                "suggested_delivery_time",
                "a string or null",
                other,
            )),
        }
    }

    pub fn alerts(&self) -> Result<Vec<&'a str>, FieldError> {
        let value = self.get("alerts")?;
        let items = value
            .as_array()
            .ok_or_else(|| FieldError::wrong_type("alerts", "a list", value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str().ok_or_else(|| {
                    FieldError::wrong_type(&format!("alerts[{index}]"), "a string", item)
                })
            })
            .collect()
    }

    pub fn fallback(&self) -> Result<&'a str, FieldError> {
        self.string("fallback")
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "an integer",
        Value::Number(_) => "a float",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
