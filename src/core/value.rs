use std::fmt;

use serde_json::Value as JsonValue;

use crate::core::FieldKind;

/// A field value as seen by predicates and aggregates.
///
/// `Number(NaN)` is the numeric sentinel for absent or non-numeric input, so a
/// numeric predicate can tell "missing" apart from a genuine zero.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Coerce a raw JSON value (or its absence) into the given kind.
    pub fn from_json(raw: Option<&JsonValue>, kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text(json_to_text(raw)),
            FieldKind::Number => Self::Number(json_to_number(raw)),
            FieldKind::Date => match raw {
                None | Some(JsonValue::Null) => Self::Null,
                Some(JsonValue::Number(n)) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
                Some(JsonValue::String(s)) if s.trim().is_empty() => Self::Null,
                Some(JsonValue::String(s)) => Self::Text(s.clone()),
                Some(_) => Self::Null,
            },
        }
    }

    /// Re-coerce an already extracted value into the given kind.
    pub fn coerce(self, kind: FieldKind) -> Self {
        match (kind, self) {
            (FieldKind::Text, Self::Null) => Self::Text(String::new()),
            (FieldKind::Text, Self::Number(n)) => Self::Text(number_text(n)),
            (FieldKind::Number, Self::Null) => Self::Number(f64::NAN),
            (FieldKind::Number, Self::Text(s)) => Self::Number(parse_number(&s)),
            (FieldKind::Date, Self::Text(s)) if s.trim().is_empty() => Self::Null,
            (FieldKind::Date, Self::Number(n)) if !n.is_finite() => Self::Null,
            (_, value) => value,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Number(_) => "NUMBER",
            Self::Text(_) => "TEXT",
        }
    }

    /// Numeric view of the value; `NaN` when it has none.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_number(s),
            Self::Null => f64::NAN,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stringified form used by text and membership predicates.
    ///
    /// Absent values, including the `NaN` number sentinel, are `""`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Number(n) => number_text(*n),
            Self::Text(s) => s.clone(),
        }
    }

    /// True for `Null`, empty text and `NaN`.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(s) => s.is_empty(),
        }
    }
}

fn json_to_text(raw: Option<&JsonValue>) -> String {
    match raw {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => json_number_text(n),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_to_number(raw: Option<&JsonValue>) -> f64 {
    match raw {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(JsonValue::String(s)) => parse_number(s),
        Some(JsonValue::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => f64::NAN,
    }
}

/// Parse a decimal string the way a lenient numeric form field would.
///
/// Blank strings are zero; anything that is not a plain decimal literal is `NaN`.
pub(crate) fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Text form of a JSON number. Integers keep every digit; floats go
/// through `format_number` so `12.0` reads as `12`.
pub(crate) fn json_number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    n.as_f64().map(number_text).unwrap_or_else(|| n.to_string())
}

fn number_text(n: f64) -> String {
    if n.is_nan() { String::new() } else { format_number(n) }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Number(a), Self::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
