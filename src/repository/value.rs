use base64::{engine::general_purpose::STANDARD, Engine as _};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Repository value types, numbered as in the JCR `PropertyType` constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyType {
    Undefined = 0,
    String = 1,
    Binary = 2,
    Long = 3,
    Double = 4,
    Date = 5,
    Boolean = 6,
    Name = 7,
    Path = 8,
    Reference = 9,
    WeakReference = 10,
    Uri = 11,
    Decimal = 12,
}

/// Errors raised while converting a string form into a typed value
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("'{value}' is not a valid {property_type} value")]
    InvalidFormat {
        property_type: &'static str,
        value: String,
    },

    #[error("invalid base64 binary value: {0}")]
    InvalidBase64(String),
}

static PROPERTY_TYPES_BY_NAME: Lazy<HashMap<&'static str, PropertyType>> = Lazy::new(|| {
    PropertyType::ALL
        .iter()
        .map(|property_type| (property_type.name(), *property_type))
        .collect()
});

impl PropertyType {
    pub const ALL: [PropertyType; 13] = [
        PropertyType::Undefined,
        PropertyType::String,
        PropertyType::Binary,
        PropertyType::Long,
        PropertyType::Double,
        PropertyType::Date,
        PropertyType::Boolean,
        PropertyType::Name,
        PropertyType::Path,
        PropertyType::Reference,
        PropertyType::WeakReference,
        PropertyType::Uri,
        PropertyType::Decimal,
    ];

    /// Wire name of the type, e.g. `String`, `Long`, `URI`
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::Undefined => "undefined",
            PropertyType::String => "String",
            PropertyType::Binary => "Binary",
            PropertyType::Long => "Long",
            PropertyType::Double => "Double",
            PropertyType::Date => "Date",
            PropertyType::Boolean => "Boolean",
            PropertyType::Name => "Name",
            PropertyType::Path => "Path",
            PropertyType::Reference => "Reference",
            PropertyType::WeakReference => "WeakReference",
            PropertyType::Uri => "URI",
            PropertyType::Decimal => "Decimal",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Look up a type by its exact wire name
    pub fn from_name(name: &str) -> Option<Self> {
        PROPERTY_TYPES_BY_NAME.get(name).copied()
    }

    /// Coerce the string form of a value into a typed value.
    /// Binary strings are base64, `undefined` is treated as String.
    pub fn parse_value(&self, raw: &str) -> Result<Value, ValueError> {
        let invalid = || ValueError::InvalidFormat {
            property_type: self.name(),
            value: raw.to_string(),
        };

        let value = match self {
            PropertyType::Undefined | PropertyType::String => Value::String(raw.to_string()),
            PropertyType::Binary => Value::Binary(
                STANDARD
                    .decode(raw.trim())
                    .map_err(|e| ValueError::InvalidBase64(e.to_string()))?,
            ),
            PropertyType::Long => Value::Long(raw.trim().parse().map_err(|_| invalid())?),
            PropertyType::Double => Value::Double(raw.trim().parse().map_err(|_| invalid())?),
            PropertyType::Date => {
                Value::Date(DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| invalid())?)
            }
            PropertyType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => return Err(invalid()),
            },
            PropertyType::Name => {
                if raw.is_empty() || raw.contains('/') {
                    return Err(invalid());
                }
                Value::Name(raw.to_string())
            }
            PropertyType::Path => {
                if raw.is_empty() {
                    return Err(invalid());
                }
                Value::Path(raw.to_string())
            }
            PropertyType::Reference => {
                Uuid::parse_str(raw.trim()).map_err(|_| invalid())?;
                Value::Reference(raw.trim().to_string())
            }
            PropertyType::WeakReference => {
                Uuid::parse_str(raw.trim()).map_err(|_| invalid())?;
                Value::WeakReference(raw.trim().to_string())
            }
            PropertyType::Uri => Value::Uri(raw.to_string()),
            PropertyType::Decimal => {
                Value::Decimal(BigDecimal::from_str(raw.trim()).map_err(|_| invalid())?)
            }
        };
        Ok(value)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::from_name(s).ok_or_else(|| format!("unknown property type '{}'", s))
    }
}

/// A single typed repository value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Binary(Vec<u8>),
    Long(i64),
    Double(f64),
    Date(DateTime<FixedOffset>),
    Boolean(bool),
    Name(String),
    Path(String),
    Reference(String),
    WeakReference(String),
    Uri(String),
    Decimal(BigDecimal),
}

impl Value {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Value::String(_) => PropertyType::String,
            Value::Binary(_) => PropertyType::Binary,
            Value::Long(_) => PropertyType::Long,
            Value::Double(_) => PropertyType::Double,
            Value::Date(_) => PropertyType::Date,
            Value::Boolean(_) => PropertyType::Boolean,
            Value::Name(_) => PropertyType::Name,
            Value::Path(_) => PropertyType::Path,
            Value::Reference(_) => PropertyType::Reference,
            Value::WeakReference(_) => PropertyType::WeakReference,
            Value::Uri(_) => PropertyType::Uri,
            Value::Decimal(_) => PropertyType::Decimal,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Date(d) => Some(*d),
            Value::String(s) => DateTime::parse_from_rfc3339(s).ok(),
            _ => None,
        }
    }
}

/// String form of a value: binaries are base64, dates are ISO-8601 with millis
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s)
            | Value::Name(s)
            | Value::Path(s)
            | Value::Reference(s)
            | Value::WeakReference(s)
            | Value::Uri(s) => f.write_str(s),
            Value::Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Value::Long(n) => write!(f, "{}", n),
            Value::Double(d) => {
                if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e15 {
                    write!(f, "{:.1}", d)
                } else {
                    write!(f, "{}", d)
                }
            }
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Millis, false)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// Value held by a property; the cardinality is part of the property's identity
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Single(Value),
    Multiple(PropertyType, Vec<Value>),
}

impl PropertyValue {
    pub fn is_multiple(&self) -> bool {
        matches!(self, PropertyValue::Multiple(..))
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Single(value) => value.property_type(),
            PropertyValue::Multiple(property_type, _) => *property_type,
        }
    }

    pub fn values(&self) -> &[Value] {
        match self {
            PropertyValue::Single(value) => std::slice::from_ref(value),
            PropertyValue::Multiple(_, values) => values,
        }
    }

    pub fn strings(&self) -> Vec<String> {
        self.values().iter().map(|v| v.to_string()).collect()
    }

    pub fn string(value: impl Into<String>) -> Self {
        PropertyValue::Single(Value::String(value.into()))
    }

    pub fn strings_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertyValue::Multiple(
            PropertyType::String,
            values.into_iter().map(|s| Value::String(s.into())).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_round_trip_through_lookup() {
        for property_type in PropertyType::ALL {
            assert_eq!(PropertyType::from_name(property_type.name()), Some(property_type));
        }
        assert_eq!(PropertyType::from_name("URI"), Some(PropertyType::Uri));
        assert_eq!(PropertyType::from_name("string"), None);
        assert_eq!(PropertyType::from_name("Text"), None);
    }

    #[test]
    fn test_codes_match_jcr_constants() {
        assert_eq!(PropertyType::String.code(), 1);
        assert_eq!(PropertyType::Binary.code(), 2);
        assert_eq!(PropertyType::Decimal.code(), 12);
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(PropertyType::Long.parse_value("42").unwrap(), Value::Long(42));
        assert_eq!(PropertyType::Double.parse_value("1.5").unwrap(), Value::Double(1.5));
        assert_eq!(PropertyType::Boolean.parse_value("TRUE").unwrap(), Value::Boolean(true));
        assert!(PropertyType::Boolean.parse_value("yes").is_err());
        assert!(PropertyType::Long.parse_value("4.2").is_err());
    }

    #[test]
    fn test_binary_is_base64() {
        let value = PropertyType::Binary.parse_value("aGVsbG8=").unwrap();
        assert_eq!(value, Value::Binary(b"hello".to_vec()));
        assert_eq!(value.to_string(), "aGVsbG8=");

        let err = PropertyType::Binary.parse_value("not base64!").unwrap_err();
        assert!(matches!(err, ValueError::InvalidBase64(_)));
    }

    #[test]
    fn test_date_string_form_keeps_offset() {
        let value = PropertyType::Date
            .parse_value("2014-03-01T10:15:30.000+01:00")
            .unwrap();
        assert_eq!(value.to_string(), "2014-03-01T10:15:30.000+01:00");
    }

    #[test]
    fn test_reference_requires_identifier() {
        assert!(PropertyType::Reference.parse_value("not-a-uuid").is_err());
        assert!(PropertyType::Reference
            .parse_value("cafebabe-cafe-babe-cafe-babecafebabe")
            .is_ok());
    }

    #[test]
    fn test_double_string_form() {
        assert_eq!(Value::Double(3.0).to_string(), "3.0");
        assert_eq!(Value::Double(0.25).to_string(), "0.25");
    }
}
