use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be bound as statement parameters or read back as row cells.
///
/// The same enum is used on both sides of a query so evaluated context values,
/// bound parameters and returned cells need no per-direction conversion:
/// ```rust
/// use mssql_connector::prelude::*;
///
/// let params = vec![
///     RowValues::Int(5),
///     RowValues::Text("ann".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value (arrays and objects from the runtime context)
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Convert a runtime-context value into a bindable value.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => RowValues::Null,
            JsonValue::Bool(b) => RowValues::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => RowValues::Int(i),
                None => n.as_f64().map_or(RowValues::Null, RowValues::Float),
            },
            JsonValue::String(s) => RowValues::Text(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => RowValues::JSON(value.clone()),
        }
    }

    /// Convert a result cell into the JSON shape handed back to the host.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => JsonValue::from(*f),
            RowValues::Text(s) => JsonValue::String(s.clone()),
            RowValues::Bool(b) => JsonValue::Bool(*b),
            RowValues::Timestamp(dt) => JsonValue::String(dt.format(TIMESTAMP_FORMAT).to_string()),
            RowValues::Null => JsonValue::Null,
            RowValues::JSON(v) => v.clone(),
            RowValues::Blob(bytes) => JsonValue::from(bytes.clone()),
        }
    }

    /// Text spliced into SQL by the legacy interpolation path.
    ///
    /// No quoting is added; template authors write their own quotes around
    /// string expressions.
    #[must_use]
    pub fn to_literal_text(&self) -> String {
        match self {
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => f.to_string(),
            RowValues::Text(s) => s.clone(),
            RowValues::Bool(b) => String::from(if *b { "1" } else { "0" }),
            RowValues::Timestamp(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
            RowValues::Null => "NULL".to_string(),
            RowValues::JSON(v) => v.to_string(),
            RowValues::Blob(bytes) => {
                let mut hex = String::with_capacity(2 + bytes.len() * 2);
                hex.push_str("0x");
                for b in bytes {
                    hex.push_str(&format!("{b:02X}"));
                }
                hex
            }
        }
    }
}

impl From<&JsonValue> for RowValues {
    fn from(value: &JsonValue) -> Self {
        RowValues::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_numbers_keep_integer_precision() {
        assert_eq!(RowValues::from_json(&json!(5)), RowValues::Int(5));
        assert_eq!(RowValues::from_json(&json!(2.5)), RowValues::Float(2.5));
        assert_eq!(
            RowValues::from_json(&json!({"a": 1})),
            RowValues::JSON(json!({"a": 1}))
        );
    }

    #[test]
    fn literal_text_for_legacy_interpolation() {
        assert_eq!(RowValues::Bool(true).to_literal_text(), "1");
        assert_eq!(RowValues::Null.to_literal_text(), "NULL");
        assert_eq!(RowValues::Blob(vec![0xde, 0x01]).to_literal_text(), "0xDE01");
    }
}
