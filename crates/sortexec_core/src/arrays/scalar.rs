use std::fmt;

use serde::{Deserialize, Serialize};
use sortexec_error::{DbError, Result};

use super::datatype::DataType;

/// A single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Utf8(String),
}

impl ScalarValue {
    /// Data type of this value.
    ///
    /// Returns None for an untyped null.
    pub fn datatype(&self) -> Option<DataType> {
        Some(match self {
            Self::Null => return None,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
        })
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Cast this value to a different type.
    ///
    /// Nulls always cast to null.
    pub fn try_cast(&self, to: DataType) -> Result<ScalarValue> {
        let cast_err = || {
            DbError::new("Failed to cast value")
                .with_field("value", self)
                .with_field("to", to)
        };

        Ok(match (self, to) {
            (Self::Null, _) => Self::Null,

            (Self::Boolean(v), DataType::Boolean) => Self::Boolean(*v),
            (Self::Boolean(v), DataType::Int32) => Self::Int32(*v as i32),
            (Self::Boolean(v), DataType::Int64) => Self::Int64(*v as i64),

            (Self::Int32(v), DataType::Int32) => Self::Int32(*v),
            (Self::Int32(v), DataType::Int64) => Self::Int64(*v as i64),
            (Self::Int32(v), DataType::Float64) => Self::Float64(*v as f64),
            (Self::Int32(v), DataType::Boolean) => Self::Boolean(*v != 0),

            (Self::Int64(v), DataType::Int64) => Self::Int64(*v),
            (Self::Int64(v), DataType::Int32) => {
                Self::Int32(i32::try_from(*v).map_err(|_| cast_err())?)
            }
            (Self::Int64(v), DataType::Float64) => Self::Float64(*v as f64),
            (Self::Int64(v), DataType::Boolean) => Self::Boolean(*v != 0),

            (Self::Float64(v), DataType::Float64) => Self::Float64(*v),
            (Self::Float64(v), DataType::Int64) => {
                if !v.is_finite() || *v < i64::MIN as f64 || *v > i64::MAX as f64 {
                    return Err(cast_err());
                }
                Self::Int64(v.trunc() as i64)
            }
            (Self::Float64(v), DataType::Int32) => {
                if !v.is_finite() || *v < i32::MIN as f64 || *v > i32::MAX as f64 {
                    return Err(cast_err());
                }
                Self::Int32(v.trunc() as i32)
            }

            (Self::Utf8(v), DataType::Utf8) => Self::Utf8(v.clone()),
            (Self::Utf8(v), DataType::Int32) => Self::Int32(v.trim().parse().map_err(|_| cast_err())?),
            (Self::Utf8(v), DataType::Int64) => Self::Int64(v.trim().parse().map_err(|_| cast_err())?),
            (Self::Utf8(v), DataType::Float64) => Self::Float64(v.trim().parse().map_err(|_| cast_err())?),
            (Self::Utf8(v), DataType::Boolean) => match v.trim().to_lowercase().as_str() {
                "true" | "t" => Self::Boolean(true),
                "false" | "f" => Self::Boolean(false),
                _ => return Err(cast_err()),
            },

            (other, DataType::Utf8) => Self::Utf8(other.to_string()),

            _ => return Err(cast_err()),
        })
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int32(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => ScalarValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_numeric() {
        assert_eq!(
            ScalarValue::Int64(4),
            ScalarValue::Int32(4).try_cast(DataType::Int64).unwrap()
        );
        assert_eq!(
            ScalarValue::Int32(-3),
            ScalarValue::Float64(-3.7).try_cast(DataType::Int32).unwrap()
        );
        ScalarValue::Int64(i64::MAX)
            .try_cast(DataType::Int32)
            .unwrap_err();
    }

    #[test]
    fn cast_utf8() {
        assert_eq!(
            ScalarValue::Int64(18),
            ScalarValue::from(" 18").try_cast(DataType::Int64).unwrap()
        );
        assert_eq!(
            ScalarValue::from("2.5"),
            ScalarValue::Float64(2.5).try_cast(DataType::Utf8).unwrap()
        );
        ScalarValue::from("cat")
            .try_cast(DataType::Int32)
            .unwrap_err();
    }

    #[test]
    fn cast_null() {
        assert_eq!(
            ScalarValue::Null,
            ScalarValue::Null.try_cast(DataType::Boolean).unwrap()
        );
    }
}
