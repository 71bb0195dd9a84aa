//! Rendering of field values as SQL literals.
//!
//! - `NULL` for absent values (an error for required fields)
//! - numbers and booleans unquoted, always with `.` as decimal separator
//! - timestamps as `'yyyy-MM-dd HH:mm:ss'`
//! - enums by ordinal
//! - text truncated to the field's max length, `'` doubled, single quoted
//!
//! Text that already starts and ends with `'` is passed through untouched so
//! callers can hand in pre-formatted literals. On fields not declared as
//! strings, text that reads as a number is emitted unquoted.

use crate::error::{SqlExtError, SqlExtResult};
use crate::meta::{FieldDescriptor, FieldKind};
use crate::value::Value;

/// Layout of date/time literals.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `value` as a literal for `field`.
pub fn format_value(field: &FieldDescriptor, value: &Value) -> SqlExtResult<String> {
    let literal = match value {
        Value::Null => {
            if field.is_required {
                return Err(SqlExtError::missing_required(&field.column_name));
            }
            "NULL".to_string()
        }
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Int(n) | Value::Enum(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Decimal(d) => d.to_string(),
        Value::DateTime(dt) => quote(&dt.format(DATETIME_FORMAT).to_string()),
        Value::Text(s) => format_text(s, field.max_length, field.kind == FieldKind::String),
    };
    Ok(literal)
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "'NaN'".to_string()
    } else if f.is_infinite() {
        let lit = if f > 0.0 { "'Infinity'" } else { "'-Infinity'" };
        lit.to_string()
    } else {
        // Display never uses exponent notation or locale separators.
        f.to_string()
    }
}

/// Render text, honouring pre-quoted input, truncation and numeric sniffing.
pub fn format_text(text: &str, max_length: Option<usize>, declared_string: bool) -> String {
    if is_pre_quoted(text) {
        return text.to_string();
    }

    let truncated = match max_length {
        Some(max) => truncate_chars(text, max),
        None => text,
    };

    if !declared_string && is_numeric(truncated) {
        return truncated.to_string();
    }
    quote(truncated)
}

/// Escape embedded quotes and wrap in single quotes.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn is_pre_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'')
}

/// Whether `text` reads as a plain number (`42`, `-3.5`, `1e3`).
pub fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.bytes().any(|b| b.is_ascii_digit()) && trimmed.parse::<f64>().is_ok()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
