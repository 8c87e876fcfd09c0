//! # Pattern Types
//!
//! Typed placeholders for path templates (`<id:int>`, `<slug:slug>`).
//!
//! A [`PatternType`] supplies the regex fragment a placeholder matches and
//! converts between the captured text and a [`ParamValue`] in both
//! directions. Built-in types are thin [`ScalarType`] values configured
//! with a tag, a fragment and a [`ParamType`]; applications register their
//! own types by implementing the trait.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// A placeholder kind: sub-pattern plus two conversions
///
/// `to_value` and `to_url` must be inverses modulo formatting, so that a
/// generated URL matches its own route and yields the same values back.
pub trait PatternType: Send + Sync + fmt::Debug {
    /// Type tag used in templates (`int` in `<id:int>`)
    fn tag(&self) -> &str;

    /// Regex fragment embedded inside the placeholder's named group
    ///
    /// Must not contain capturing groups of its own.
    fn regex(&self) -> &str;

    /// Convert captured text into its logical value
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the text cannot be converted.
    fn to_value(&self, raw: &str) -> Result<ParamValue>;

    /// Format a value as a URL segment
    fn to_url(&self, value: &ParamValue) -> String;
}

/// Value kinds a placeholder can convert to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamType {
    /// String type (default) - no conversion
    #[default]
    String,
    /// Integer type - parses to i64
    Int,
    /// Float type - parses to f64
    Float,
    /// Boolean type - parses "true"/"false" or "1"/"0"
    Bool,
}

impl ParamType {
    /// Get the type name for error messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Converted parameter value
///
/// Produced when a placeholder is captured, and accepted as a positional
/// argument when generating a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// String value (no conversion performed)
    String(String),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl ParamValue {
    /// Get the value as a string
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Convert raw string to typed value based on `ParamType`
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if conversion fails.
pub fn convert_param(raw: &str, param_type: ParamType) -> Result<ParamValue> {
    let rejected = || Error::invalid_argument(format!("Cannot convert '{raw}' to {param_type}"));
    match param_type {
        ParamType::String => Ok(ParamValue::String(raw.to_string())),
        ParamType::Int => raw.parse::<i64>().map(ParamValue::Int).map_err(|_| rejected()),
        ParamType::Float => raw.parse::<f64>().map(ParamValue::Float).map_err(|_| rejected()),
        ParamType::Bool => match raw.to_lowercase().as_str() {
            "true" | "1" => Ok(ParamValue::Bool(true)),
            "false" | "0" => Ok(ParamValue::Bool(false)),
            _ => Err(rejected()),
        },
    }
}

/// Split a path segment into placeholder name and type tag
///
/// A segment is a placeholder iff it starts with `<` and ends with `>`.
///
/// - `<id:int>` -> `Some(("id", "int"))`
/// - `<id>` -> `Some(("id", ""))`
/// - `static` -> `None`
#[must_use]
pub fn parse_placeholder(segment: &str) -> Option<(&str, &str)> {
    if segment.len() >= 2 && segment.starts_with('<') && segment.ends_with('>') {
        let inner = &segment[1..segment.len() - 1];
        Some(inner.split_once(':').unwrap_or((inner, "")))
    } else {
        None
    }
}

/// Built-in placeholder type backed by a `ParamType`
///
/// `width` zero-pads integers on the way out, so `<month:month>` renders
/// `3` as `03` and still matches its own fragment.
#[derive(Debug, Clone)]
pub struct ScalarType {
    tag: String,
    regex: String,
    kind: ParamType,
    width: usize,
}

impl ScalarType {
    /// Create a type with the given tag, fragment and value kind
    pub fn new(tag: impl Into<String>, regex: impl Into<String>, kind: ParamType) -> Self {
        Self {
            tag: tag.into(),
            regex: regex.into(),
            kind,
            width: 0,
        }
    }

    /// Zero-pad integer values to `width` digits when formatting
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// `<name:int>` - ASCII digits, converted to i64
    #[must_use]
    pub fn int() -> Self {
        Self::new("int", "[0-9]+", ParamType::Int)
    }

    /// `<name:str>` - word characters
    #[must_use]
    pub fn str() -> Self {
        Self::new("str", r"\w+", ParamType::String)
    }

    /// `<name:slug>` - word characters and dashes
    #[must_use]
    pub fn slug() -> Self {
        Self::new("slug", r"[\w-]+", ParamType::String)
    }

    /// `<name:alpha>` - ASCII letters only
    #[must_use]
    pub fn alpha() -> Self {
        Self::new("alpha", "[a-zA-Z]+", ParamType::String)
    }

    /// `<name:bool>` - `true`, `false`, `1` or `0`
    #[must_use]
    pub fn bool() -> Self {
        Self::new("bool", "true|false|1|0", ParamType::Bool)
    }

    /// `<name:float>` - unsigned decimal number
    #[must_use]
    pub fn float() -> Self {
        Self::new("float", r"[0-9]+(?:\.[0-9]+)?", ParamType::Float)
    }

    /// `<name:year>` - four digit year
    #[must_use]
    pub fn year() -> Self {
        Self::new("year", "[0-9]{4}", ParamType::Int).with_width(4)
    }

    /// `<name:month>` - two digit month, `01` to `12`
    #[must_use]
    pub fn month() -> Self {
        Self::new("month", "0[1-9]|1[0-2]", ParamType::Int).with_width(2)
    }

    /// `<name:day>` - two digit day of month, `01` to `31`
    #[must_use]
    pub fn day() -> Self {
        Self::new("day", "0[1-9]|[12][0-9]|3[01]", ParamType::Int).with_width(2)
    }

    /// The value kind captured text converts to
    #[must_use]
    pub const fn kind(&self) -> ParamType {
        self.kind
    }
}

impl PatternType for ScalarType {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn regex(&self) -> &str {
        &self.regex
    }

    fn to_value(&self, raw: &str) -> Result<ParamValue> {
        convert_param(raw, self.kind)
    }

    fn to_url(&self, value: &ParamValue) -> String {
        match value {
            ParamValue::Int(i) if self.width > 0 => format!("{i:0width$}", width = self.width),
            other => other.as_string(),
        }
    }
}
