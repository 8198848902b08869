//! Bind values and raw SQL fragments.
//!
//! [`Value`] is the owned scalar carried in a statement's bind list. It is
//! never interpolated into SQL text; the caller hands it to whatever driver
//! executes the statement. [`Raw`] is the escape hatch for literal SQL in a
//! value position (`NOW()`, `UNIX_TIMESTAMP(?)`), optionally carrying its
//! own bind values.

use serde::Serialize;

use crate::error::{BuildError, BuildResult};

/// An owned scalar bind value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Convert a JSON scalar into a bind value.
///
/// Arrays and objects are not scalars and are rejected with
/// [`BuildError::TypeMismatch`]; serialize them yourself and bind the
/// resulting text if that is what you mean.
impl TryFrom<serde_json::Value> for Value {
    type Error = BuildError;

    fn try_from(v: serde_json::Value) -> BuildResult<Self> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(BuildError::type_mismatch(format!(
                        "JSON number {n} does not fit a bind value"
                    )))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Array(_) => Err(BuildError::type_mismatch(
                "expected a JSON scalar, got an array",
            )),
            serde_json::Value::Object(_) => Err(BuildError::type_mismatch(
                "expected a JSON scalar, got an object",
            )),
        }
    }
}

/// A literal SQL fragment used in a value position.
///
/// The fragment text is inserted verbatim; any `?` placeholders it contains
/// must be matched one-for-one by values added with [`Raw::bind`].
///
/// # Example
/// ```
/// use sqlforge::Raw;
///
/// let now = Raw::new("NOW()");
/// let ts = Raw::new("UNIX_TIMESTAMP(?)").bind("2011-04-12 00:34:12");
/// assert_eq!(ts.bind_values().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    sql: String,
    bind: Vec<Value>,
}

impl Raw {
    /// Create a raw fragment from literal SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bind: Vec::new(),
        }
    }

    /// Append a bind value for the next `?` placeholder in the fragment.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.bind.push(value.into());
        self
    }

    /// The fragment's SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The fragment's bind values, in placeholder order.
    pub fn bind_values(&self) -> &[Value] {
        &self.bind
    }

    /// An empty fragment produces no SQL at all, which would silently drop
    /// the column it stands for; refuse it.
    pub(crate) fn validate(&self) -> BuildResult<()> {
        if self.sql.is_empty() {
            return Err(BuildError::invalid_argument("empty raw SQL fragment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }

    #[test]
    fn value_from_json_scalars() {
        assert_eq!(
            Value::try_from(serde_json::json!("bob")).unwrap(),
            Value::Text("bob".to_string())
        );
        assert_eq!(Value::try_from(serde_json::json!(5)).unwrap(), Value::Int(5));
        assert_eq!(
            Value::try_from(serde_json::json!(1.5)).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(Value::try_from(serde_json::json!(null)).unwrap(), Value::Null);
    }

    #[test]
    fn value_rejects_json_composites() {
        let err = Value::try_from(serde_json::json!([1, 2])).unwrap_err();
        assert!(err.is_type_mismatch());
        let err = Value::try_from(serde_json::json!({"a": 1})).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn raw_accumulates_binds_in_order() {
        let raw = Raw::new("GREATEST(?, ?)").bind(1i64).bind(2i64);
        assert_eq!(raw.sql(), "GREATEST(?, ?)");
        assert_eq!(raw.bind_values(), &[Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn raw_rejects_empty_sql() {
        assert!(Raw::new("").validate().is_err());
    }
}
