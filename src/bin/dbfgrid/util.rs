use anyhow::{anyhow, bail, Result};
use serde_json::Value as Json;

use dbfgrid::{Date, FieldDescriptor, FieldType, FieldValue};

/// JSON shape of one cell value.
pub fn value_to_json(v: &FieldValue) -> Json {
    match v {
        FieldValue::Null => Json::Null,
        FieldValue::Character(s) => Json::String(s.trim_end().to_string()),
        FieldValue::Integer(n) => Json::from(*n),
        FieldValue::Double(x) => Json::from(*x),
        FieldValue::Date(d) => Json::String(d.to_string()),
        FieldValue::Logical(b) => Json::Bool(*b),
    }
}

/// Parse CLI text into a value of the column's declared type.
/// An empty string (or "null") means a blank field.
pub fn parse_value(fd: &FieldDescriptor, text: &str) -> Result<FieldValue> {
    let t = text.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("null") {
        return Ok(FieldValue::Null);
    }
    match fd.field_type {
        FieldType::Character => Ok(FieldValue::Character(t.to_string())),
        FieldType::Numeric | FieldType::Float => {
            if fd.decimals == 0 {
                if let Ok(n) = t.parse::<i64>() {
                    return Ok(FieldValue::Integer(n));
                }
            }
            t.parse::<f64>()
                .map(FieldValue::Double)
                .map_err(|_| anyhow!("'{}' is not a number", t))
        }
        FieldType::Date => parse_date(t),
        FieldType::Logical => match t {
            "T" | "t" | "Y" | "y" | "true" | "1" => Ok(FieldValue::Logical(true)),
            "F" | "f" | "N" | "n" | "false" | "0" => Ok(FieldValue::Logical(false)),
            _ => bail!("'{}' is not a logical (T/F)", t),
        },
    }
}

/// Accepts YYYYMMDD and YYYY-MM-DD.
fn parse_date(t: &str) -> Result<FieldValue> {
    let digits: String = t.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 || t.chars().any(|c| !c.is_ascii_digit() && c != '-') {
        bail!("'{}' is not a date (YYYYMMDD or YYYY-MM-DD)", t);
    }
    Ok(FieldValue::Date(Date {
        year: digits[0..4].parse()?,
        month: digits[4..6].parse()?,
        day: digits[6..8].parse()?,
    }))
}

/// Parse one "NAME:TYPE[:LENGTH[:DECIMALS]]" field spec.
pub fn parse_field_spec(spec: &str) -> Result<FieldDescriptor> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 2 || parts[0].is_empty() {
        bail!("bad field spec '{}'", spec);
    }
    let name = parts[0].to_string();
    let tag = parts[1].as_bytes().first().copied().unwrap_or(0).to_ascii_uppercase();
    let length: u8 = match parts.get(2) {
        Some(s) => s.parse()?,
        None => 0,
    };
    let decimals: u8 = match parts.get(3) {
        Some(s) => s.parse()?,
        None => 0,
    };
    match tag {
        b'C' => Ok(FieldDescriptor::character(name, if length == 0 { 10 } else { length })),
        b'N' => Ok(FieldDescriptor::numeric(name, if length == 0 { 10 } else { length }, decimals)),
        b'F' => Ok(FieldDescriptor::new(
            name,
            FieldType::Float,
            if length == 0 { 10 } else { length },
            decimals,
        )),
        b'D' => Ok(FieldDescriptor::date(name)),
        b'L' => Ok(FieldDescriptor::logical(name)),
        _ => bail!("unknown field type in '{}'", spec),
    }
}
