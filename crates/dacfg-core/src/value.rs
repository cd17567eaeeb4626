use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::NAME_FLOAT_DIGITS;

/// Nested settings, keyed in insertion order.
pub type Settings = IndexMap<String, Value>;

/// Anything that can be referred to by a short identifying name
/// (an algorithm, a model setup, ...).
pub trait ShortName {
    fn short_name(&self) -> &str;
}

/// Reference to a named entity defined elsewhere, e.g. a DA method.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ShortName for Ident {
    fn short_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A single setting value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    #[default]
    None,
    Ident(Ident),
    Int(i64),
    Float(#[serde(with = "float_repr")] f64),
    Bool(bool),
    Text(String),
    Record(Settings),
}

impl Value {
    pub fn ident(name: impl Into<String>) -> Self {
        Value::Ident(Ident::new(name))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The short name, for values that carry one.
    pub fn short_name(&self) -> Option<&str> {
        match self {
            Value::Ident(id) => Some(id.short_name()),
            _ => None,
        }
    }

    /// Variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Ident(_) => "ident",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
        }
    }

    /// Abbreviated form used inside synthesized names.
    ///
    /// Named entities print their short name, booleans `1`/`0`, floats
    /// five significant digits, `None` nothing. Everything else falls back
    /// to `Display`.
    pub fn abbreviated(&self) -> String {
        if let Some(name) = self.short_name() {
            return name.to_string();
        }
        match self {
            Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            Value::Float(x) => format_general(*x, NAME_FLOAT_DIGITS),
            Value::None => String::new(),
            other => other.to_string(),
        }
    }
}

/// Integers and floats compare numerically across variants.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Ident(a), Value::Ident(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(x)) | (Value::Float(x), Value::Int(i)) => {
                int_eq_float(*i, *x)
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

/// Exact comparison: `x` must be integral and in range of `i64`.
fn int_eq_float(i: i64, x: f64) -> bool {
    // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
    x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 && x as i64 == i
}

/// JSON has no NaN or infinities, so those travel as `"nan"`, `"inf"` and
/// `"-inf"`.
mod float_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
        if x.is_finite() {
            s.serialize_f64(*x)
        } else if x.is_nan() {
            s.serialize_str("nan")
        } else if *x > 0.0 {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Word(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Number(x) => Ok(x),
            Repr::Word(word) => match word.as_str() {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float `{other}`"))),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Ident(id) => write!(f, "{id}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (key, val)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={val}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<Ident> for Value {
    fn from(id: Ident) -> Self {
        Value::Ident(id)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Settings> for Value {
    fn from(fields: Settings) -> Self {
        Value::Record(fields)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

/// Default text for floats: integral values keep a `.0`.
fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// printf-style `%.{precision}g`: fixed or scientific notation depending on
/// the exponent, trailing zeros dropped.
pub fn format_general(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return (if x > 0.0 { "inf" } else { "-inf" }).to_string();
    }
    let precision = precision.max(1);

    // Exponent after rounding to `precision` significant digits.
    let sci = format!("{:.*e}", precision - 1, x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
