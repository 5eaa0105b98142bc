use crate::error::diagnostics::DiagnosticMessage;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

/// Declared type of one query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Int,
    Float,
    Bool,
    Date,
    Datetime,
    Time,
}

/// A concrete, typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Datetime(NaiveDateTime),
    Time(NaiveTime),
    String(String),
}

#[derive(Debug, Error)]
#[error("cannot read value as {expected:?}: {context}")]
pub struct CoercionError {
    pub expected: ParamType,
    pub context: DiagnosticMessage,
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Date(_) => ParamType::Date,
            ParamValue::Datetime(_) => ParamType::Datetime,
            ParamValue::Time(_) => ParamType::Time,
            ParamValue::String(_) => ParamType::String,
        }
    }

    /// Coerce an untyped JSON value against a declared parameter type.
    ///
    /// Agent-supplied values arrive as JSON; the declared [`ParamType`] is
    /// authoritative. Dates and times are accepted as ISO-8601 strings, ints
    /// are accepted for float parameters, everything else must match.
    #[track_caller]
    pub fn from_json(ty: ParamType, raw: &Json) -> Result<Self, CoercionError> {
        let mismatch = |expected: ParamType| CoercionError {
            expected,
            context: DiagnosticMessage::new(format!("got {raw}")),
        };

        match ty {
            ParamType::String => raw
                .as_str()
                .map(|s| ParamValue::String(s.to_string()))
                .ok_or_else(|| mismatch(ty)),
            ParamType::Int => raw.as_i64().map(ParamValue::Int).ok_or_else(|| mismatch(ty)),
            ParamType::Float => raw.as_f64().map(ParamValue::Float).ok_or_else(|| mismatch(ty)),
            ParamType::Bool => raw.as_bool().map(ParamValue::Bool).ok_or_else(|| mismatch(ty)),
            ParamType::Date => raw
                .as_str()
                .and_then(|s| s.parse::<NaiveDate>().ok())
                .map(ParamValue::Date)
                .ok_or_else(|| mismatch(ty)),
            ParamType::Datetime => raw
                .as_str()
                .and_then(|s| s.parse::<NaiveDateTime>().ok())
                .map(ParamValue::Datetime)
                .ok_or_else(|| mismatch(ty)),
            ParamType::Time => raw
                .as_str()
                .and_then(|s| s.parse::<NaiveTime>().ok())
                .map(ParamValue::Time)
                .ok_or_else(|| mismatch(ty)),
        }
    }
}

/// One declared parameter of a query template: name, type, and the default
/// (example) value the template is previewed with.
///
/// The declared type is authoritative at intake: a default arriving as JSON
/// is coerced through [`ParamValue::from_json`], so `type = "float"` with
/// `default = 100` holds `Float(100.0)`, not `Int(100)`. A default the type
/// cannot absorb fails deserialization.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub default: ParamValue,
}

impl<'de> Deserialize<'de> for ParamSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            #[serde(rename = "type")]
            ty: ParamType,
            default: Json,
        }

        let raw = Raw::deserialize(deserializer)?;
        let default =
            ParamValue::from_json(raw.ty, &raw.default).map_err(serde::de::Error::custom)?;
        Ok(Self {
            name: raw.name,
            ty: raw.ty,
            default,
        })
    }
}

/// A concrete value bound to a named placeholder for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub value: ParamValue,
}

/// A named SQL text with `{name}` placeholders and the ordered parameter
/// list that fills them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTemplate {
    pub name: String,
    /// SQL text with parameters in curly braces, e.g.
    /// `SELECT * FROM orders WHERE amount > {min_amount}`.
    pub text: String,
    pub params: Vec<ParamSpec>,
}

impl QueryTemplate {
    /// Bindings built from every parameter's default value, in declaration
    /// order. Used for the one-shot preview evaluation after a template is
    /// saved.
    pub fn default_bindings(&self) -> Vec<Binding> {
        self.params
            .iter()
            .map(|p| Binding {
                name: p.name.clone(),
                value: p.default.clone(),
            })
            .collect()
    }
}
