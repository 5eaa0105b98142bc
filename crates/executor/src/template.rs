//! Textual placeholder substitution.
//!
//! Substitution is deliberately textual, not AST-level: each binding's
//! `{name}` token is replaced with a typed literal, once per parameter in
//! input order. Two known, documented limitations follow from that choice:
//! string values are embedded verbatim with no quote escaping, and a
//! substituted value that itself contains a later placeholder token is
//! rewritten by the later pass.

use crate::error::ExecutorError;
use common::{Binding, ParamValue, QueryTemplate};
use serde_json::Value as Json;
use std::collections::HashMap;

/// Encode a typed value as a SQL literal.
///
/// Strings are single-quoted with the value embedded verbatim; floats always
/// carry a fractional part so the literal stays unambiguous across dialects.
pub fn encode_literal(value: &ParamValue) -> String {
    match value {
        ParamValue::String(s) => format!("'{s}'"),
        ParamValue::Bool(true) => "TRUE".to_string(),
        ParamValue::Bool(false) => "FALSE".to_string(),
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => {
            if v.fract() == 0.0 && v.is_finite() {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        }
        // chrono's Display for these types is ISO-8601.
        ParamValue::Date(v) => format!("'{v}'"),
        ParamValue::Datetime(v) => format!("'{}'", v.format("%Y-%m-%dT%H:%M:%S")),
        ParamValue::Time(v) => format!("'{v}'"),
    }
}

/// Substitute every binding into the template text.
///
/// Each binding's placeholder must be present, otherwise the call fails with
/// [`ExecutorError::MissingPlaceholder`]. A silent no-op here would hand
/// the agent a query it believes is filtered when it is not.
pub fn render(template: &QueryTemplate, bindings: &[Binding]) -> Result<String, ExecutorError> {
    let mut sql = template.text.clone();
    for binding in bindings {
        let placeholder = format!("{{{}}}", binding.name);
        if !sql.contains(&placeholder) {
            return Err(ExecutorError::missing_placeholder(&binding.name));
        }
        sql = sql.replace(&placeholder, &encode_literal(&binding.value));
    }
    Ok(sql)
}

/// Render with every parameter's default value, for preview evaluation.
pub fn render_with_defaults(template: &QueryTemplate) -> Result<String, ExecutorError> {
    render(template, &template.default_bindings())
}

/// Coerce raw JSON values against the template's declared parameter types
/// and build bindings, in declaration order. Parameters the caller did not
/// supply fall back to their defaults.
pub fn bind_values(
    template: &QueryTemplate,
    values: &HashMap<String, Json>,
) -> Result<Vec<Binding>, ExecutorError> {
    template
        .params
        .iter()
        .map(|param| {
            let value = match values.get(&param.name) {
                Some(raw) => ParamValue::from_json(param.ty, raw)
                    .map_err(ExecutorError::type_coercion)?,
                None => param.default.clone(),
            };
            Ok(Binding {
                name: param.name.clone(),
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use common::{ParamSpec, ParamType};

    fn template(text: &str, params: Vec<ParamSpec>) -> QueryTemplate {
        QueryTemplate {
            name: "t".into(),
            text: text.into(),
            params,
        }
    }

    fn bind(name: &str, value: ParamValue) -> Binding {
        Binding {
            name: name.into(),
            value,
        }
    }

    #[test]
    fn substitutes_every_bound_placeholder() {
        let t = template("SELECT * FROM orders WHERE amount > {min} AND open = {open}", vec![]);
        let sql = render(
            &t,
            &[bind("min", ParamValue::Float(100.0)), bind("open", ParamValue::Bool(true))],
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM orders WHERE amount > 100.0 AND open = TRUE");
        assert!(!sql.contains('{'));
    }

    #[test]
    fn missing_placeholder_is_an_error_not_a_noop() {
        let t = template("SELECT * FROM orders", vec![]);
        let err = render(&t, &[bind("min", ParamValue::Int(1))]).unwrap_err();
        assert!(matches!(err, ExecutorError::MissingPlaceholder { .. }));
    }

    #[test]
    fn string_literals_are_quoted_but_not_escaped() {
        // Documented limitation: the embedded quote is left as-is.
        assert_eq!(
            encode_literal(&ParamValue::String("O'Brien".into())),
            "'O'Brien'"
        );
    }

    #[test]
    fn bool_and_temporal_literals() {
        assert_eq!(encode_literal(&ParamValue::Bool(true)), "TRUE");
        assert_eq!(encode_literal(&ParamValue::Bool(false)), "FALSE");
        assert_eq!(
            encode_literal(&ParamValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())),
            "'2024-01-05'"
        );
        assert_eq!(
            encode_literal(&ParamValue::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap())),
            "'09:30:00'"
        );
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(encode_literal(&ParamValue::Datetime(dt)), "'2024-01-05T09:30:00'");
    }

    #[test]
    fn whole_floats_keep_a_fractional_part() {
        assert_eq!(encode_literal(&ParamValue::Float(100.0)), "100.0");
        assert_eq!(encode_literal(&ParamValue::Float(0.5)), "0.5");
        assert_eq!(encode_literal(&ParamValue::Int(100)), "100");
    }

    #[test]
    fn defaults_render_the_preview_query() {
        let t = template(
            "SELECT * FROM orders WHERE amount > {min_amount}",
            vec![ParamSpec {
                name: "min_amount".into(),
                ty: ParamType::Float,
                default: ParamValue::Float(100.0),
            }],
        );
        assert_eq!(
            render_with_defaults(&t).unwrap(),
            "SELECT * FROM orders WHERE amount > 100.0"
        );
    }

    #[test]
    fn json_supplied_defaults_render_as_their_declared_type() {
        let t: QueryTemplate = serde_json::from_value(serde_json::json!({
            "name": "big orders",
            "text": "SELECT * FROM orders WHERE amount > {min_amount}",
            "params": [{"name": "min_amount", "type": "float", "default": 100}]
        }))
        .unwrap();
        assert_eq!(
            render_with_defaults(&t).unwrap(),
            "SELECT * FROM orders WHERE amount > 100.0"
        );
    }

    #[test]
    fn bind_values_coerces_against_declared_types() {
        let t = template(
            "SELECT * FROM orders WHERE amount > {min_amount} AND day = {day}",
            vec![
                ParamSpec {
                    name: "min_amount".into(),
                    ty: ParamType::Float,
                    default: ParamValue::Float(100.0),
                },
                ParamSpec {
                    name: "day".into(),
                    ty: ParamType::Date,
                    default: ParamValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                },
            ],
        );

        // An int is acceptable for a float parameter; the date falls back
        // to its default.
        let mut values = std::collections::HashMap::new();
        values.insert("min_amount".to_string(), serde_json::json!(250));
        let bindings = bind_values(&t, &values).unwrap();
        assert_eq!(
            render(&t, &bindings).unwrap(),
            "SELECT * FROM orders WHERE amount > 250.0 AND day = '2024-01-01'"
        );

        values.insert("day".to_string(), serde_json::json!(17));
        let err = bind_values(&t, &values).unwrap_err();
        assert!(matches!(err, ExecutorError::TypeCoercion { .. }));
    }

    #[test]
    fn substitution_is_textual_and_ordered() {
        // A substituted value that happens to contain a later placeholder
        // token gets rewritten by the later pass. Known hazard of textual
        // substitution; pinned here so a change is deliberate.
        let t = template("SELECT {a}, {b}", vec![]);
        let sql = render(
            &t,
            &[
                bind("a", ParamValue::String("{b}".into())),
                bind("b", ParamValue::Int(2)),
            ],
        )
        .unwrap();
        assert_eq!(sql, "SELECT '2', 2");
    }
}
