//! The tagged attribute value model.
//!
//! [`AttributeValue`] is the wire-format algebraic type: every scalar carries
//! its storage kind, numbers are kept as decimal text, and composites are maps
//! or lists of further attribute values.

use std::{collections::HashMap, fmt::Display};

use bytes::Bytes;

use crate::TagID;

mod wire;

/// A top-level attribute map, the "one row" shape handed to the store.
pub type Item = HashMap<String, AttributeValue>;

/// A tagged attribute value.
///
/// # Example
///
/// ```
/// use dynamo_codec::{AttributeValue, TagID};
///
/// let value = AttributeValue::number(20.05);
/// assert_eq!(value.tag(), TagID::Number);
/// assert_eq!(value.as_number(), Some("20.05"));
/// assert_eq!(value.as_string(), None);
/// ```
#[derive(Clone, PartialEq, Debug)]
pub enum AttributeValue {
    /// `S`
    String(String),
    /// `N`, decimal text.
    Number(String),
    /// `B`, opaque bytes.
    Binary(Bytes),
    /// `BOOL`
    Bool(bool),
    /// `NULL`, an explicit absence marker.
    Null,
    /// `SS`, kept in stored order.
    StringSet(Vec<String>),
    /// `NS`, kept in stored order.
    NumberSet(Vec<String>),
    /// `M`
    Map(Item),
    /// `L`
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Builds a `Number` from anything with a decimal `Display` form.
    pub fn number(value: impl Display) -> Self {
        AttributeValue::Number(value.to_string())
    }

    pub const fn tag(&self) -> TagID {
        match self {
            AttributeValue::String(_) => TagID::String,
            AttributeValue::Number(_) => TagID::Number,
            AttributeValue::Binary(_) => TagID::Binary,
            AttributeValue::Bool(_) => TagID::Bool,
            AttributeValue::Null => TagID::Null,
            AttributeValue::StringSet(_) => TagID::StringSet,
            AttributeValue::NumberSet(_) => TagID::NumberSet,
            AttributeValue::Map(_) => TagID::Map,
            AttributeValue::List(_) => TagID::List,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&str> {
        match self {
            AttributeValue::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            AttributeValue::Binary(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_null(&self) -> Option<()> {
        match self {
            AttributeValue::Null => Some(()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_string_set(&self) -> Option<&[String]> {
        match self {
            AttributeValue::StringSet(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_number_set(&self) -> Option<&[String]> {
        match self {
            AttributeValue::NumberSet(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Item> {
        match self {
            AttributeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Re-tags a list whose elements are all strings or all numbers as the
    /// matching set. Order is preserved; empty lists and lists of any other
    /// makeup are returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use dynamo_codec::AttributeValue;
    ///
    /// let list = AttributeValue::List(vec!["foo".into(), "bar".into()]);
    /// assert_eq!(
    ///     list.into_set(),
    ///     AttributeValue::StringSet(vec!["foo".into(), "bar".into()])
    /// );
    ///
    /// let mixed = AttributeValue::List(vec!["foo".into(), AttributeValue::number(1)]);
    /// assert_eq!(mixed.clone().into_set(), mixed);
    /// ```
    pub fn into_set(self) -> Self {
        let AttributeValue::List(values) = self else {
            return self;
        };
        match values.first().map(AttributeValue::tag) {
            Some(TagID::String) if values.iter().all(|v| v.tag() == TagID::String) => {
                AttributeValue::StringSet(values.into_iter().filter_map(into_text).collect())
            }
            Some(TagID::Number) if values.iter().all(|v| v.tag() == TagID::Number) => {
                AttributeValue::NumberSet(values.into_iter().filter_map(into_text).collect())
            }
            _ => AttributeValue::List(values),
        }
    }
}

fn into_text(value: AttributeValue) -> Option<String> {
    match value {
        AttributeValue::String(text) | AttributeValue::Number(text) => Some(text),
        _ => None,
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<Bytes> for AttributeValue {
    fn from(value: Bytes) -> Self {
        AttributeValue::Binary(value)
    }
}

impl From<Item> for AttributeValue {
    fn from(value: Item) -> Self {
        AttributeValue::Map(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        AttributeValue::List(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}
