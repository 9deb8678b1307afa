//! Tagged variable values and the numeric coercion rules applied to them.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// A value held in the variable store.
///
/// Values written through macros are stored as [`Value::Text`]. Numeric and
/// boolean readings are produced on demand at the call site through
/// [`Value::as_number`] and [`crate::logic::evaluate`], never by mutating the
/// stored value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Value {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A text value.
    Text(String),
}

impl Value {
    /// Read a piece of text the way every call site does: an integer if it
    /// has no fractional part, else a float, else the text itself.
    pub fn coerce(text: &str) -> Self {
        match Number::parse(text) {
            Some(Number::Int(n)) => Self::Integer(n),
            Some(Number::Float(f)) => Self::Float(f),
            None => Self::Text(text.to_string()),
        }
    }

    /// The numeric reading of this value, if it has one.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Integer(n) => Some(Number::Int(*n)),
            Self::Float(f) => Number::from_f64(*f),
            Self::Text(s) => Number::parse(s),
            Self::Boolean(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Null => Self::Text(String::new()),
            // Lists and maps are kept as their compact JSON text.
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Self::Integer(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

/// A numeric reading of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A whole number.
    Int(i64),
    /// A finite number with a fractional part.
    Float(f64),
}

impl Number {
    /// Parse text as a number.
    ///
    /// Whole values (including `"5.0"`) become [`Number::Int`]. Non-finite
    /// spellings such as `"inf"` or `"NaN"` are not numbers.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        if let Ok(n) = t.parse::<i64>() {
            return Some(Self::Int(n));
        }
        t.parse::<f64>().ok().and_then(Self::from_f64)
    }

    /// Normalize a float, collapsing whole values into [`Number::Int`].
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Some(Self::Int(f as i64))
        } else {
            Some(Self::Float(f))
        }
    }

    /// This number as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(f) => f,
        }
    }

    /// Apply an arithmetic operator.
    ///
    /// Integer operations that overflow continue in floating point. Division
    /// always divides in floating point and normalizes the quotient, so
    /// `6 / 3` yields `2` and `7 / 2` yields `3.5`.
    pub fn apply(self, op: ArithOp, rhs: Self) -> CoreResult<Self> {
        if let (Self::Int(a), Self::Int(b)) = (self, rhs) {
            let exact = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Div => None,
            };
            if let Some(n) = exact {
                return Ok(Self::Int(n));
            }
        }

        let (a, b) = (self.as_f64(), rhs.as_f64());
        let result = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0.0 {
                    return Err(CoreError::DivisionByZero);
                }
                a / b
            }
        };
        Self::from_f64(result).ok_or(CoreError::NumericOverflow)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

/// The arithmetic operators exposed as `var::add|sub|mul|div`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

/// Combine two operands.
///
/// When either operand has no numeric reading the result is the two texts
/// concatenated, whatever the operator.
pub fn arithmetic(op: ArithOp, lhs: &Value, rhs: &Value) -> CoreResult<Value> {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => a.apply(op, b).map(Value::from),
        _ => Ok(Value::Text(format!("{lhs}{rhs}"))),
    }
}
