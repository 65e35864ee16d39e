use serde_json::{Number, Value};
use smol_str::SmolStr;

use crate::arena::Shape;
use crate::num::number::format_json_number;

/// Typed payload of a text leaf.
///
/// Kept apart from the leaf's label so that numbers keep their native
/// precision and comparisons can be numeric rather than lexicographic.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Returns the scalar for a JSON leaf, or `None` for arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Scalar::Null => Shape::Null,
            Scalar::Bool(_) => Shape::Bool,
            Scalar::Number(_) => Shape::Number,
            Scalar::String(_) => Shape::String,
        }
    }

    /// Canonical text form used as a text leaf's label.
    pub fn to_label(&self) -> SmolStr {
        match self {
            Scalar::Null => SmolStr::default(),
            Scalar::Bool(true) => SmolStr::new_static("true"),
            Scalar::Bool(false) => SmolStr::new_static("false"),
            Scalar::Number(n) => SmolStr::from(format_json_number(n)),
            Scalar::String(s) => SmolStr::from(s.as_str()),
        }
    }

    /// Numeric view used by relational comparisons; `NaN` when there is none.
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::Null => f64::NAN,
            Scalar::Bool(b) => f64::from(u8::from(*b)),
            Scalar::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Scalar::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(Number::from(n))
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(Number::from(n))
    }
}

/// NaN and infinities have no JSON form and convert to [`Scalar::Null`].
impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Scalar::Null, Scalar::Number)
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::String(s) => Value::String(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!(null), "")]
    #[case(json!(true), "true")]
    #[case(json!(false), "false")]
    #[case(json!(30), "30")]
    #[case(json!(8.95), "8.95")]
    #[case(json!("John"), "John")]
    fn test_label_forms(#[case] value: Value, #[case] expected: &str) {
        let scalar = Scalar::from_json(&value).unwrap();
        assert_eq!(scalar.to_label(), expected);
        assert_eq!(scalar.to_json(), value);
    }

    #[rstest]
    fn test_containers_are_not_scalars() {
        assert!(Scalar::from_json(&json!([1])).is_none());
        assert!(Scalar::from_json(&json!({"a": 1})).is_none());
    }

    #[rstest]
    fn test_numeric_view() {
        assert_eq!(Scalar::from(12.99).as_f64(), 12.99);
        assert_eq!(Scalar::from(" 7 ").as_f64(), 7.0);
        assert_eq!(Scalar::from(true).as_f64(), 1.0);
        assert!(Scalar::Null.as_f64().is_nan());
        assert!(Scalar::from("abc").as_f64().is_nan());
    }

    #[rstest]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(Scalar::from(f64::NAN), Scalar::Null);
        assert_eq!(Scalar::from(f64::INFINITY), Scalar::Null);
        assert_eq!(Scalar::from(f64::NEG_INFINITY), Scalar::Null);
        assert_eq!(Scalar::from(1.5), Scalar::Number(Number::from_f64(1.5).unwrap()));
    }
}
