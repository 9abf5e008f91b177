//! The JSON-style wire shape of an attribute value.
//!
//! Each value is a single-entry object keyed by its type descriptor, e.g.
//! `{"S": "foo"}`, `{"N": "1"}`, `{"NULL": true}` or `{"M": {...}}`.
//! Binary payloads are carried as standard base64 text.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, IgnoredAny, MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{AttributeValue, Item, TagID};

struct Base64<'a>(&'a [u8]);

impl Serialize for Base64<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(self.0))
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let descriptor = self.tag().descriptor();
        match self {
            AttributeValue::String(value) | AttributeValue::Number(value) => {
                map.serialize_entry(descriptor, value)?
            }
            AttributeValue::Binary(value) => map.serialize_entry(descriptor, &Base64(value))?,
            AttributeValue::Bool(value) => map.serialize_entry(descriptor, value)?,
            AttributeValue::Null => map.serialize_entry(descriptor, &true)?,
            AttributeValue::StringSet(values) | AttributeValue::NumberSet(values) => {
                map.serialize_entry(descriptor, values)?
            }
            AttributeValue::Map(values) => map.serialize_entry(descriptor, values)?,
            AttributeValue::List(values) => map.serialize_entry(descriptor, values)?,
        }
        map.end()
    }
}

struct AttributeValueVisitor;

impl<'de> Visitor<'de> for AttributeValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object with exactly one attribute type descriptor")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Some(descriptor) = map.next_key::<String>()? else {
            return Err(de::Error::invalid_length(0, &self));
        };
        let Some(tag) = TagID::from_descriptor(&descriptor) else {
            return Err(de::Error::unknown_field(
                &descriptor,
                &["S", "N", "B", "BOOL", "NULL", "SS", "NS", "M", "L"],
            ));
        };
        let value = match tag {
            TagID::String => AttributeValue::String(map.next_value()?),
            TagID::Number => AttributeValue::Number(map.next_value()?),
            TagID::Binary => {
                let text: String = map.next_value()?;
                let decoded = STANDARD.decode(text.as_bytes()).map_err(de::Error::custom)?;
                AttributeValue::Binary(Bytes::from(decoded))
            }
            TagID::Bool => AttributeValue::Bool(map.next_value()?),
            TagID::Null => {
                if !map.next_value::<bool>()? {
                    return Err(de::Error::invalid_value(
                        de::Unexpected::Bool(false),
                        &"`true` for the NULL descriptor",
                    ));
                }
                AttributeValue::Null
            }
            TagID::StringSet => AttributeValue::StringSet(map.next_value()?),
            TagID::NumberSet => AttributeValue::NumberSet(map.next_value()?),
            TagID::Map => AttributeValue::Map(map.next_value::<Item>()?),
            TagID::List => AttributeValue::List(map.next_value()?),
        };
        if map.next_key::<IgnoredAny>()?.is_some() {
            return Err(de::Error::custom(format!(
                "attribute value has more than one type descriptor (first was {descriptor})"
            )));
        }
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributeValueVisitor)
    }
}
