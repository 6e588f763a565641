use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The key a record is stored under inside a normalized store.
///
/// A single identity field yields its value unchanged: text stays text and
/// integers stay integers. Composite identities are always [`Identity::Text`],
/// built by string-coercing each field value and joining with `_`.
///
/// Ordering: all numbers sort before all text; within a kind the natural
/// order applies.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Number(i64),
    Text(String),
}

impl Identity {
    /// Separator used between the parts of a composite identity.
    pub const COMPOSITE_SEPARATOR: &'static str = "_";

    /// Build a composite identity from already-coerced parts.
    pub fn composite<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(Self::COMPOSITE_SEPARATOR);
        Self::Text(joined)
    }

    /// Convert a single field value into an identity without coercion.
    ///
    /// Returns `None` for floats and booleans, which are not valid scalar keys.
    pub fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Text(s) => Some(Self::Text(s)),
            Scalar::Integer(n) => Some(Self::Number(n)),
            Scalar::Float(_) | Scalar::Bool(_) => None,
        }
    }

    /// Returns the text form if this is a text identity.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Returns the integer form if this is a numeric identity.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "Identity({n})"),
            Self::Text(s) => write!(f, "Identity({s:?})"),
        }
    }
}

impl From<i64> for Identity {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Identity {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<u32> for Identity {
    fn from(n: u32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A single field value exposed by a record.
///
/// Records surface their fields as scalars so that key extraction and
/// comparers can work without knowing the concrete record type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Read a scalar out of a JSON value.
    ///
    /// `null`, arrays and objects have no scalar form and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Total ordering used by field comparers.
    ///
    /// Booleans sort first, then numbers (integers and floats compared by
    /// value), then text. NaN sorts after every other number.
    pub fn compare(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.total_cmp(&b);
        }
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Integer(_) | Self::Float(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// A record paired with the identity it will be stored under.
///
/// Events carry `Keyed` records so the reducer never has to extract keys
/// itself: extraction happens, and may fail, before an event exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub id: Identity,
    pub record: T,
}

impl<T> Keyed<T> {
    pub fn new(id: impl Into<Identity>, record: T) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn composite_joins_with_underscore() {
        let id = Identity::composite(["1", "Test"]);
        assert_eq!(id, Identity::Text("1_Test".into()));
        assert_eq!(id.to_string(), "1_Test");
    }

    #[test]
    fn from_scalar_keeps_kind() {
        assert_eq!(Identity::from_scalar(Scalar::Integer(7)), Some(Identity::Number(7)));
        assert_eq!(
            Identity::from_scalar(Scalar::Text("a".into())),
            Some(Identity::Text("a".into()))
        );
        assert_eq!(Identity::from_scalar(Scalar::Float(1.5)), None);
        assert_eq!(Identity::from_scalar(Scalar::Bool(true)), None);
    }

    #[test]
    fn numbers_sort_before_text() {
        let mut ids = vec![Identity::from("b"), Identity::from(2), Identity::from("a"), Identity::from(1)];
        ids.sort();
        assert_eq!(
            ids,
            vec![Identity::from(1), Identity::from(2), Identity::from("a"), Identity::from("b")]
        );
    }

    #[test]
    fn identity_serializes_untagged() {
        assert_eq!(serde_json::to_value(Identity::from(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(Identity::from("x")).unwrap(), json!("x"));
    }

    #[test]
    fn scalar_from_json() {
        assert_eq!(Scalar::from_json(&json!(5)), Some(Scalar::Integer(5)));
        assert_eq!(Scalar::from_json(&json!(2.5)), Some(Scalar::Float(2.5)));
        assert_eq!(Scalar::from_json(&json!("s")), Some(Scalar::Text("s".into())));
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn scalar_compare_mixes_numbers() {
        assert_eq!(Scalar::Integer(2).compare(&Scalar::Float(2.5)), Ordering::Less);
        assert_eq!(Scalar::Float(3.0).compare(&Scalar::Integer(3)), Ordering::Equal);
        assert_eq!(Scalar::Integer(100).compare(&Scalar::Text("1".into())), Ordering::Less);
        assert_eq!(Scalar::Bool(true).compare(&Scalar::Integer(0)), Ordering::Less);
    }
}
