use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be interpolated into a statement or read back from a row.
///
/// Reuse the same enum for parameters and results so helper functions do not
/// need to branch on driver types:
/// ```rust
/// use tsql_template::prelude::*;
///
/// let params = vec![
///     SqlValue::Int(1),
///     SqlValue::Text("alice".into()),
///     SqlValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
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
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
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
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S.%3f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<JsonValue> for SqlValue {
    fn from(value: JsonValue) -> Self {
        SqlValue::JSON(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

/// SQL Server binding types for explicit parameter annotation.
///
/// The compiler treats these as opaque tags; they only matter once the
/// parameter is bound into a request, where an explicit type overrides the
/// wire type inferred from the value's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float,
    Bit,
    VarChar,
    NVarChar,
    Text,
    DateTime,
    VarBinary,
    Decimal,
}

/// Per-binding options accompanying an explicit type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindOptions {
    /// Declared maximum length for text/binary bindings.
    pub length: Option<usize>,
    /// Total significant digits for decimal bindings.
    pub precision: Option<u8>,
    /// Digits to the right of the decimal point for decimal bindings.
    pub scale: Option<u8>,
}

impl BindOptions {
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// A raw value together with its optional binding annotation.
///
/// A bare value is the same thing with `ty` and `options` unset; the
/// annotation is purely a tag and is never validated against the value until
/// the parameter is bound into a request.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    /// Explicit binding type, if any.
    pub ty: Option<SqlType>,
    /// The raw value.
    pub value: SqlValue,
    /// Per-binding options, if any.
    pub options: Option<BindOptions>,
}

impl TypedValue {
    /// Attach per-binding options to an annotated value.
    #[must_use]
    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl From<SqlValue> for TypedValue {
    fn from(value: SqlValue) -> Self {
        TypedValue {
            ty: None,
            value,
            options: None,
        }
    }
}

/// Annotate a raw value with an explicit binding type.
///
/// ```rust
/// use tsql_template::prelude::*;
///
/// let annotated = typed(SqlType::NVarChar, "alice")
///     .with_options(BindOptions::default().with_length(32));
/// assert_eq!(annotated.ty, Some(SqlType::NVarChar));
/// ```
pub fn typed(ty: SqlType, value: impl Into<SqlValue>) -> TypedValue {
    TypedValue {
        ty: Some(ty),
        value: value.into(),
        options: None,
    }
}
