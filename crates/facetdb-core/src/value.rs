use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Scalar
///
/// One strictly-typed attribute value. The schema store's driver layer
/// returns everything as text; `Scalar` is what the engine hands back after
/// coercion, and what option/default values are modeled as.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Bool(bool),
    DateTime(DateTime<Utc>),
    Decimal(Decimal),
    Float(f64),
    Int(i64),
    Text(String),
}

impl Scalar {
    /// Stable name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Decimal(_) => "decimal",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Text(_) => "text",
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Parse a driver-native textual value as a boolean.
    ///
    /// The store encodes booleans as `0`/`1`; anything else non-empty that
    /// parses as a number is truthy when non-zero.
    #[must_use]
    pub fn parse_bool(raw: &str) -> Self {
        let truthy = match raw.trim() {
            "" | "0" => false,
            "1" => true,
            other => other.parse::<f64>().map(|n| n != 0.0).unwrap_or(false),
        };

        Self::Bool(truthy)
    }

    /// Parse a driver-native textual value as an integer, truncating a
    /// decimal tail the way numeric columns surface through text drivers.
    #[must_use]
    pub fn parse_int(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Self::Int(v);
        }

        // "4.0000" from a NUMERIC column read as integer family
        let int_part = trimmed.split('.').next().unwrap_or("");
        Self::Int(int_part.parse::<i64>().unwrap_or(0))
    }

    /// Parse a driver-native textual value as a float. NaN never comes out
    /// of a numeric column, so it is treated as unparseable.
    #[must_use]
    pub fn parse_float(raw: &str) -> Self {
        let parsed = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| !f.is_nan())
            .unwrap_or(0.0);
        Self::Float(parsed)
    }

    /// Parse a driver-native textual value as a datetime.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS` and bare `YYYY-MM-DD`; anything else
    /// falls back to `Text` so no data is lost.
    #[must_use]
    pub fn parse_datetime(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Self::DateTime(dt.and_utc());
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Self::DateTime(dt.and_utc());
            }
        }

        Self::Text(trimmed.to_string())
    }

    /// Parse a driver-native textual value as a decimal, falling back to
    /// `Text` when it does not parse.
    #[must_use]
    pub fn parse_decimal(raw: &str) -> Self {
        raw.trim()
            .parse::<Decimal>()
            .map_or_else(|_| Self::Text(raw.trim().to_string()), Self::Decimal)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", u8::from(*v)),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
