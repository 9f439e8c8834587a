//! Dataset attribute values.
//!
//! NetCDF attributes come in many numeric widths; they are widened to
//! `i64`/`f64` here so that schema expectations written in YAML can be
//! compared against them directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A widened attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
}

/// The type of an attribute value, for type-only expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    Int,
    Float,
    /// Either `Int` or `Float`.
    Number,
    Text,
    List,
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Int(_) => AttrKind::Int,
            AttrValue::Float(_) => AttrKind::Float,
            AttrValue::Text(_) => AttrKind::Text,
            AttrValue::List(_) => AttrKind::List,
        }
    }

    /// Numeric view of scalar values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Text(s) => s.trim().parse().ok(),
            AttrValue::List(_) => None,
        }
    }

    /// Value equality where `Int(3)` equals `Float(3.0)`.
    ///
    /// Float comparisons allow one part in 10^6 so that `f32` attributes
    /// match the `f64` literals written in configuration.
    pub fn matches(&self, other: &AttrValue) -> bool {
        match (self, other) {
            (AttrValue::Text(a), AttrValue::Text(b)) => a.trim() == b.trim(),
            (AttrValue::List(a), AttrValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y))
            }
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                (x - y).abs() <= 1e-6 * x.abs().max(y.abs()).max(1.0)
            }
            _ => false,
        }
    }

    /// True when the value is of `kind`.
    pub fn is_kind(&self, kind: AttrKind) -> bool {
        match kind {
            AttrKind::Number => self.is_numeric(),
            other => self.kind() == other,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, AttrValue::Int(_) | AttrValue::Float(_))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Text(s) => write!(f, "{:?}", s),
            AttrValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttrKind::Int => "int",
            AttrKind::Float => "float",
            AttrKind::Number => "number",
            AttrKind::Text => "text",
            AttrKind::List => "list",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_float_equivalence() {
        assert!(AttrValue::Int(3000).matches(&AttrValue::Float(3000.0)));
        assert!(AttrValue::Float(64.0).matches(&AttrValue::Float(64.0_f32 as f64)));
        assert!(!AttrValue::Int(1).matches(&AttrValue::Int(2)));
    }

    #[test]
    fn test_f32_attribute_matches_yaml_literal() {
        let from_file = AttrValue::Float(65.3_f32 as f64);
        assert!(from_file.matches(&AttrValue::Float(65.3)));
    }

    #[test]
    fn test_text_is_trimmed() {
        assert!(AttrValue::Text("AKFB ".into()).matches(&AttrValue::Text("AKFB".into())));
        assert!(!AttrValue::Text("1".into()).matches(&AttrValue::Int(1)));
    }

    #[test]
    fn test_kind_number_accepts_both() {
        assert!(AttrValue::Int(1).is_kind(AttrKind::Number));
        assert!(AttrValue::Float(1.5).is_kind(AttrKind::Number));
        assert!(!AttrValue::Text("x".into()).is_kind(AttrKind::Number));
        assert!(!AttrValue::Int(1).is_kind(AttrKind::Float));
    }
}
