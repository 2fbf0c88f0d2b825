//! Built-in transforms: `str`, `int`, `float`, `datetime`, `lookup`,
//! `template`, `aggregate`.
//!
//! All of them read their options from the rule's transform block
//! (`default`, `precision`, `table`, …) and fall back to the `default`
//! parameter instead of erroring when input does not fit.

use crate::datetime;
use crate::outcome::TransformOutcome;
use dpp_model::TransformSpec;
use serde_json::Value;
use std::fmt::Write as _;

/// `str`: render any scalar as a string. The fallback for missing input is
/// the `default` parameter, or the empty string when none is given.
pub fn to_str(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    if value.is_null() {
        let default = spec
            .param("default")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        return TransformOutcome::fallback(default, "no input value");
    }
    TransformOutcome::applied(scalar_text(value))
}

/// `int`: coerce to an integer, truncating toward zero. Accepts numeric
/// strings with a fractional part (`"123.45"` becomes `123`).
pub fn to_int(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    if is_missing(value) {
        return TransformOutcome::fallback(spec.default_value(), "no input value");
    }
    let Some(number) = numeric(value) else {
        return TransformOutcome::fallback(
            spec.default_value(),
            format!("cannot read {} as a number", terse(value)),
        );
    };
    if !number.is_finite() {
        return TransformOutcome::fallback(spec.default_value(), "value is not finite");
    }
    let truncated = number.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return TransformOutcome::fallback(spec.default_value(), "value out of integer range");
    }
    TransformOutcome::applied(truncated as i64)
}

/// `float`: coerce to a float, optionally rounded to `precision` digits.
pub fn to_float(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    if is_missing(value) {
        return TransformOutcome::fallback(spec.default_value(), "no input value");
    }
    let Some(mut number) = numeric(value) else {
        return TransformOutcome::fallback(
            spec.default_value(),
            format!("cannot read {} as a number", terse(value)),
        );
    };
    if let Some(digits) = spec.param_usize("precision") {
        let factor = 10f64.powi(digits as i32);
        number = (number * factor).round() / factor;
    }
    match serde_json::Number::from_f64(number) {
        Some(number) => TransformOutcome::applied(Value::Number(number)),
        None => TransformOutcome::fallback(spec.default_value(), "value is not finite"),
    }
}

/// `datetime`: parse a datetime string and re-render it.
///
/// `input_format` pins the parse (strftime syntax); without it a list of
/// common formats is tried. `output_format` (alias `format`) defaults to
/// ISO 8601.
pub fn to_datetime(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    if is_missing(value) {
        return TransformOutcome::fallback(spec.default_value(), "no input value");
    }
    let Value::String(text) = value else {
        return TransformOutcome::fallback(
            spec.default_value(),
            format!("datetime expects a string, got {}", terse(value)),
        );
    };

    let parsed = match spec.param_str("input_format") {
        Some(format) => datetime::parse_with_format(text.trim(), format),
        None => datetime::parse_auto(text),
    };
    let Some(stamp) = parsed else {
        return TransformOutcome::fallback(
            spec.default_value(),
            format!("cannot parse {text:?} as a datetime"),
        );
    };

    // Rendering through fmt::Write instead of to_string: chrono reports a
    // malformed output format as a fmt error, which must not panic.
    let output = spec
        .param_str("output_format")
        .or_else(|| spec.param_str("format"))
        .unwrap_or(datetime::ISO_8601);
    let mut rendered = String::new();
    if write!(rendered, "{}", stamp.format(output)).is_err() {
        return TransformOutcome::fallback(
            spec.default_value(),
            format!("invalid output format {output:?}"),
        );
    }
    TransformOutcome::applied(rendered)
}

/// `lookup`: map the value through the `table` parameter. Keys are the
/// string renderings of the input (`"true"`, `"42"`, `"Grade A"`).
pub fn lookup(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    let Some(Value::Object(table)) = spec.param("table") else {
        return TransformOutcome::fallback(spec.default_value(), "lookup has no table");
    };
    if value.is_null() {
        return TransformOutcome::fallback(spec.default_value(), "no input value");
    }
    let key = scalar_text(value);
    match table.get(&key) {
        Some(mapped) => TransformOutcome::applied(mapped.clone()),
        None => TransformOutcome::fallback(
            spec.default_value(),
            format!("key {key:?} not in lookup table"),
        ),
    }
}

/// `template`: substitute the value into the `template` parameter.
///
/// `{value}` is the resolved source value; any other `{name}` placeholder
/// reads the parameter of that name. `{{` and `}}` escape literal braces.
/// A template that cannot be rendered comes through unrendered.
pub fn template(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    let raw = spec.param_str("template").unwrap_or_default();
    match render_template(raw, value, spec) {
        Ok(rendered) => TransformOutcome::applied(rendered),
        Err(reason) => TransformOutcome::fallback(Value::String(raw.to_string()), reason),
    }
}

/// `aggregate`: combine a list with the `operation` parameter — `sum`,
/// `count`, or `collect` (the default). A scalar input counts as a
/// one-element list; nulls are ignored.
pub fn aggregate(value: &Value, spec: &TransformSpec) -> TransformOutcome {
    let items: Vec<Value> = match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    let operation = spec.param_str("operation").unwrap_or("collect");

    match operation {
        "sum" => {
            let mut total = 0.0;
            for item in items.iter().filter(|item| !item.is_null()) {
                match numeric(item) {
                    Some(number) => total += number,
                    None => {
                        return TransformOutcome::fallback(
                            spec.default_value(),
                            format!("cannot sum non-numeric {}", terse(item)),
                        );
                    }
                }
            }
            match serde_json::Number::from_f64(total) {
                Some(number) => TransformOutcome::applied(Value::Number(number)),
                None => TransformOutcome::fallback(spec.default_value(), "sum is not finite"),
            }
        }
        "count" => {
            let count = items.iter().filter(|item| !item.is_null()).count();
            TransformOutcome::applied(count as u64)
        }
        "collect" => {
            let kept: Vec<Value> = items.into_iter().filter(|item| !item.is_null()).collect();
            TransformOutcome::applied(Value::Array(kept))
        }
        other => TransformOutcome::fallback(
            Value::Array(items),
            format!("unknown aggregate operation {other:?}"),
        ),
    }
}

/// Null and the empty string both mean "nothing arrived from the source".
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// String form used for `str`, lookup keys, and template substitution.
/// Strings pass through unquoted; null renders empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Short rendering for fallback reasons.
fn terse(value: &Value) -> String {
    match value {
        Value::String(text) => format!("{text:?}"),
        other => other.to_string(),
    }
}

fn render_template(
    template: &str,
    value: &Value,
    spec: &TransformSpec,
) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(current) = chars.next() {
        match current {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err("unmatched '}' in template".to_string()),
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err("unclosed '{' in template".to_string());
                }
                if name == "value" {
                    out.push_str(&scalar_text(value));
                } else if let Some(param) = spec.param(&name) {
                    out.push_str(&scalar_text(param));
                } else {
                    return Err(format!("unknown placeholder {name:?}"));
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
