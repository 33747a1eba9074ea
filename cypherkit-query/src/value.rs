//! Operands accepted by the compiler and the parameter map it produces.

use cypherkit_api::chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc,
};
use cypherkit_api::{Point, PropertyValue};
use indexmap::IndexMap;
use serde::Serialize;

/// Raw statement text, e.g. a function call such as `datetime()`.
///
/// A literal is never parameter-bound: its text is spliced into the statement
/// verbatim. Only pass trusted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(String);

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Literal(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A value in a condition, a property map or a SET clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Bound through the parameter allocator.
    Value(PropertyValue),
    /// Spliced verbatim.
    Literal(Literal),
}

impl Operand {
    pub fn literal(text: impl Into<String>) -> Self {
        Operand::Literal(Literal::new(text))
    }
}

impl From<Literal> for Operand {
    fn from(literal: Literal) -> Self {
        Operand::Literal(literal)
    }
}

impl From<PropertyValue> for Operand {
    fn from(value: PropertyValue) -> Self {
        Operand::Value(value)
    }
}

macro_rules! operand_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Value(PropertyValue::from(value))
                }
            }
        )*
    };
}

operand_from_value!(
    &str,
    String,
    i64,
    i32,
    u32,
    f64,
    bool,
    Point,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<FixedOffset>,
    DateTime<Utc>,
    TimeDelta,
    Vec<PropertyValue>,
    Vec<&str>,
    Vec<String>,
    Vec<i64>,
);

/// Named statement parameters in registration order.
///
/// # Example
///
/// ```ignore
/// let compiled = QueryBuilder::new().limit(10).compile()?;
/// assert_eq!(compiled.parameters.get("limit"), Some(&PropertyValue::Int(10)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params {
    inner: IndexMap<String, PropertyValue>,
}

impl Params {
    /// Creates a new empty parameters map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter value, replacing any previous value under `name`.
    ///
    /// Parameters are referenced in statements using `$name` syntax.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Gets a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.inner.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.inner.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, PropertyValue> {
        self.inner
    }
}

impl IntoIterator for Params {
    type Item = (String, PropertyValue);
    type IntoIter = indexmap::map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
