use chrono::{DateTime, Utc};
use std::fmt;

use super::field::FieldType;
use crate::errors::DatastoreError;

/// ISO-8601 with a numeric offset, e.g. `2024-03-01T10:15:00+00:00`.
const ISO_8601: &str = "%Y-%m-%dT%H:%M:%S%:z";
const DATE_ONLY: &str = "%Y-%m-%d";

/// A field's current value, as seen by the mapping layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
}

#[must_use]
pub fn format_iso8601(value: &DateTime<Utc>) -> String {
    value.format(ISO_8601).to_string()
}

#[must_use]
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format(DATE_ONLY).to_string()
}

/// # Errors
///
/// Returns the parser's message when `raw` is not RFC 3339.
pub fn parse_iso8601(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

impl FieldValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Emptiness as used by `field_exists(_, true)`: null, `""`, `"0"`,
    /// zero and `false` are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty() || s == "0",
            FieldValue::Int(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Boolean(b) => !*b,
            FieldValue::DateTime(_) => false,
        }
    }

    /// Convert to the representation demanded by `field_type`. Null stays null.
    ///
    /// # Errors
    ///
    /// Returns `FieldConversion` when the value cannot represent the type.
    pub fn coerce(self, field: &str, field_type: FieldType) -> Result<Self, DatastoreError> {
        let fail = |reason: String| DatastoreError::conversion(field, field_type, reason);

        match (field_type, self) {
            (_, FieldValue::Null) => Ok(FieldValue::Null),

            (FieldType::String, FieldValue::DateTime(dt)) => {
                Ok(FieldValue::String(format_iso8601(&dt)))
            }
            (FieldType::String, FieldValue::String(s)) => Ok(FieldValue::String(s)),
            (FieldType::String, other) => Ok(FieldValue::String(other.to_string())),

            (FieldType::Int, FieldValue::Int(i)) => Ok(FieldValue::Int(i)),
            #[allow(clippy::cast_possible_truncation)]
            (FieldType::Int, FieldValue::Float(f)) if f.fract() == 0.0 && f.is_finite() => {
                Ok(FieldValue::Int(f as i64))
            }
            (FieldType::Int, FieldValue::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|e| fail(format!("{s:?}: {e}"))),
            (FieldType::Int, other) => Err(fail(format!("{other:?} is not an integer"))),

            (FieldType::Float, FieldValue::Float(f)) => Ok(FieldValue::Float(f)),
            #[allow(clippy::cast_precision_loss)]
            (FieldType::Float, FieldValue::Int(i)) => Ok(FieldValue::Float(i as f64)),
            (FieldType::Float, FieldValue::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|e| fail(format!("{s:?}: {e}"))),
            (FieldType::Float, other) => Err(fail(format!("{other:?} is not a number"))),

            (FieldType::Boolean, FieldValue::Boolean(b)) => Ok(FieldValue::Boolean(b)),
            (FieldType::Boolean, FieldValue::Int(i)) => Ok(FieldValue::Boolean(i != 0)),
            (FieldType::Boolean, FieldValue::String(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(FieldValue::Boolean(true)),
                    "false" | "0" | "" => Ok(FieldValue::Boolean(false)),
                    _ => Err(fail(format!("{s:?} is not a boolean"))),
                }
            }
            (FieldType::Boolean, other) => Err(fail(format!("{other:?} is not a boolean"))),

            (FieldType::DateTime, FieldValue::DateTime(dt)) => Ok(FieldValue::DateTime(dt)),
            (FieldType::DateTime, FieldValue::String(s)) => parse_iso8601(&s)
                .map(FieldValue::DateTime)
                .map_err(|e| fail(format!("{s:?}: {e}"))),
            (FieldType::DateTime, other) => Err(fail(format!("{other:?} is not a DateTime"))),
        }
    }

    /// Plain JSON form used by export; datetimes become ISO-8601 strings.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::DateTime(dt) => serde_json::Value::String(format_iso8601(dt)),
        }
    }

    /// # Errors
    ///
    /// Returns `FieldConversion` when the value cannot be coerced to `String`.
    pub fn into_string(self, field: &str) -> Result<Option<String>, DatastoreError> {
        match self.coerce(field, FieldType::String)? {
            FieldValue::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `FieldConversion` when the value cannot be coerced to `Int`.
    pub fn into_int(self, field: &str) -> Result<Option<i64>, DatastoreError> {
        match self.coerce(field, FieldType::Int)? {
            FieldValue::Int(i) => Ok(Some(i)),
            _ => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `FieldConversion` when the value cannot be coerced to `Float`.
    pub fn into_float(self, field: &str) -> Result<Option<f64>, DatastoreError> {
        match self.coerce(field, FieldType::Float)? {
            FieldValue::Float(f) => Ok(Some(f)),
            _ => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `FieldConversion` when the value cannot be coerced to `Boolean`.
    pub fn into_bool(self, field: &str) -> Result<Option<bool>, DatastoreError> {
        match self.coerce(field, FieldType::Boolean)? {
            FieldValue::Boolean(b) => Ok(Some(b)),
            _ => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `FieldConversion` when the value cannot be coerced to `DateTime`.
    pub fn into_datetime(self, field: &str) -> Result<Option<DateTime<Utc>>, DatastoreError> {
        match self.coerce(field, FieldType::DateTime)? {
            FieldValue::DateTime(dt) => Ok(Some(dt)),
            _ => Ok(None),
        }
    }
}

/// Rendering used in hashes and string coercion. Null renders empty.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::DateTime(dt) => f.write_str(&format_iso8601(dt)),
        }
    }
}

macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value.into())
            }
        }

        impl From<Option<$ty>> for FieldValue {
            fn from(value: Option<$ty>) -> Self {
                value.map_or(FieldValue::Null, FieldValue::from)
            }
        }
    };
}

impl_from_scalar!(String, String);
impl_from_scalar!(&str, String);
impl_from_scalar!(i64, Int);
impl_from_scalar!(i32, Int);
impl_from_scalar!(f64, Float);
impl_from_scalar!(bool, Boolean);
impl_from_scalar!(DateTime<Utc>, DateTime);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(
            FieldValue::from("42").coerce("views", FieldType::Int).unwrap(),
            FieldValue::Int(42)
        );
        assert_eq!(
            FieldValue::from("2.5").coerce("rating", FieldType::Float).unwrap(),
            FieldValue::Float(2.5)
        );
        assert!(
            FieldValue::from("many")
                .coerce("views", FieldType::Int)
                .is_err()
        );
    }

    #[test]
    fn test_coerce_datetime_requires_rfc3339() {
        let parsed = FieldValue::from("2024-03-01T10:15:00Z")
            .coerce("created", FieldType::DateTime)
            .unwrap();
        assert_eq!(
            parsed,
            FieldValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap())
        );

        let err = FieldValue::from("yesterday")
            .coerce("created", FieldType::DateTime)
            .unwrap_err();
        assert!(err.to_string().contains("created"));
    }

    #[test]
    fn test_null_survives_every_coercion() {
        for ty in [
            FieldType::String,
            FieldType::Int,
            FieldType::Float,
            FieldType::Boolean,
            FieldType::DateTime,
        ] {
            assert_eq!(FieldValue::Null.coerce("x", ty).unwrap(), FieldValue::Null);
        }
    }

    #[test]
    fn test_emptiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::from("0").is_empty());
        assert!(FieldValue::Int(0).is_empty());
        assert!(FieldValue::Boolean(false).is_empty());
        assert!(!FieldValue::from("x").is_empty());
    }

    #[test]
    fn test_iso8601_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap();
        assert_eq!(format_iso8601(&dt), "2024-03-01T10:15:00+00:00");
        assert_eq!(format_date(&dt), "2024-03-01");
    }
}
