//! Cell values extracted from grid rows

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// A value produced by a column accessor for one row.
///
/// The grid never inspects row types directly; every sort, filter and export
/// decision is made on the `CellValue` an accessor returns.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Absent value (null or undefined at the source)
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Calendar date without time
    Date(NaiveDate),
    /// Date and time without timezone
    DateTime(NaiveDateTime),
    /// Instant in UTC
    Timestamp(DateTime<Utc>),
    /// Ordered collection of values
    List(Vec<CellValue>),
    /// Structured value (objects that have no native variant)
    Json(serde_json::Value),
}

impl CellValue {
    /// Check if the value is absent
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is an empty string or an empty collection.
    ///
    /// Numbers and booleans are never empty, and neither is `Null`.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::List(items) => items.is_empty(),
            CellValue::Json(serde_json::Value::String(s)) => s.is_empty(),
            CellValue::Json(serde_json::Value::Array(items)) => items.is_empty(),
            CellValue::Json(serde_json::Value::Object(map)) => map.is_empty(),
            _ => false,
        }
    }

    /// Check if the value is a date or time
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            CellValue::Date(_) | CellValue::DateTime(_) | CellValue::Timestamp(_)
        )
    }

    /// Try to get as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as f64 (numbers only, text is not parsed)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Milliseconds since the Unix epoch for temporal values.
    ///
    /// Dates and naive date-times are interpreted as UTC.
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            CellValue::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis()),
            CellValue::DateTime(dt) => Some(dt.and_utc().timestamp_millis()),
            CellValue::Timestamp(ts) => Some(ts.timestamp_millis()),
            _ => None,
        }
    }

    /// ISO 8601 text for temporal values
    pub fn to_iso_string(&self) -> Option<String> {
        match self {
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
            CellValue::Timestamp(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
            CellValue::Date(_) | CellValue::DateTime(_) | CellValue::Timestamp(_) => {
                write!(f, "{}", self.to_iso_string().unwrap_or_default())
            }
            CellValue::List(items) => {
                for (ix, item) in items.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            CellValue::Json(serde_json::Value::String(s)) => write!(f, "{}", s),
            CellValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::Text(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CellValue {
                fn from(value: $ty) -> Self {
                    CellValue::Int(value as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        CellValue::Float(value as f64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Timestamp(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(value: Vec<T>) -> Self {
        CellValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) => CellValue::Text(s),
            serde_json::Value::Array(items) => {
                CellValue::List(items.into_iter().map(CellValue::from).collect())
            }
            object @ serde_json::Value::Object(_) => CellValue::Json(object),
        }
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        CellValue::from(value.clone())
    }
}
