//! Read handles over the frame on top of the decoder's stack.

use std::collections::hash_map;
use std::marker::PhantomData;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::{self, Deserialize, DeserializeSeed};

use super::Decoder;
use super::key::MapKeyDeserializer;
use super::storage::{DecodingContainer, Elements};
use crate::{AttributeValue, CodingKey, CodingPath, Error, Item, Result, Shape, TagID};

/// Reads entries of a map frame.
///
/// A source opened with [`open_nested_keyed`](Self::open_nested_keyed) owns
/// the frame it was opened on and pops it, together with its path step, when
/// dropped.
pub struct KeyedSource<'a, 'de> {
    decoder: &'a mut Decoder<'de>,
    map: &'de Item,
    entries: hash_map::Iter<'de, String, AttributeValue>,
    pending: Option<(&'de str, &'de AttributeValue)>,
    owns_frame: bool,
}

impl<'a, 'de> KeyedSource<'a, 'de> {
    pub(crate) fn new(decoder: &'a mut Decoder<'de>, map: &'de Item, owns_frame: bool) -> Self {
        Self {
            decoder,
            map,
            entries: map.iter(),
            pending: None,
            owns_frame,
        }
    }

    #[inline]
    pub fn coding_path(&self) -> &CodingPath {
        &self.decoder.path
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// All keys of the map, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &'de str> + use<'de> {
        self.map.keys().map(String::as_str)
    }

    /// The raw value stored under `key`.
    pub fn get(&self, key: &str) -> Result<&'de AttributeValue> {
        self.map.get(key).ok_or_else(|| Error::KeyNotFound {
            path: self.decoder.path.clone(),
            key: key.to_owned(),
        })
    }

    /// Whether the value under `key` is `NULL`.
    pub fn decode_nil(&self, key: &str) -> Result<bool> {
        self.get(key).map(AttributeValue::is_null)
    }

    /// Decodes the value under `key`.
    pub fn decode<T>(&mut self, key: &str) -> Result<T>
    where
        T: Deserialize<'de>,
    {
        let value = self.get(key)?;
        self.decoder.descend(
            CodingKey::from(key),
            DecodingContainer::Single(value),
            |decoder| T::deserialize(decoder),
        )
    }

    /// Opens the map stored under `key`.
    pub fn open_nested_keyed(&mut self, key: &str) -> Result<KeyedSource<'_, 'de>> {
        let value = self.get(key)?;
        self.decoder.open_nested_keyed(
            CodingKey::from(key),
            DecodingContainer::Single(value),
        )
    }

    /// Opens the sequence or set stored under `key`.
    pub fn open_nested_unkeyed(&mut self, key: &str) -> Result<UnkeyedSource<'_, 'de>> {
        let value = self.get(key)?;
        self.decoder.open_nested_unkeyed(
            CodingKey::from(key),
            DecodingContainer::Single(value),
        )
    }
}

impl Drop for KeyedSource<'_, '_> {
    fn drop(&mut self) {
        if self.owns_frame {
            self.decoder.leave();
        }
    }
}

impl<'de> de::MapAccess<'de> for KeyedSource<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = Some((key.as_str(), value));
        seed.deserialize(MapKeyDeserializer {
            key,
            path: &self.decoder.path,
        })
        .map(Some)
        .map_err(|error| error.at_path(&self.decoder.path.join(CodingKey::from(key.as_str()))))
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let Some((key, value)) = self.pending.take() else {
            return Err(de::Error::custom("map value requested before its key"));
        };
        self.decoder.descend(
            CodingKey::from(key),
            DecodingContainer::Single(value),
            |decoder| seed.deserialize(decoder),
        )
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Reads the elements of a sequence frame in order.
///
/// The cursor only moves forward, and only past elements that decoded
/// successfully.
pub struct UnkeyedSource<'a, 'de> {
    decoder: &'a mut Decoder<'de>,
    elements: Elements<'de>,
    current_index: usize,
    owns_frame: bool,
}

impl<'a, 'de> UnkeyedSource<'a, 'de> {
    pub(crate) fn new(decoder: &'a mut Decoder<'de>, elements: Elements<'de>, owns_frame: bool) -> Self {
        Self {
            decoder,
            elements,
            current_index: 0,
            owns_frame,
        }
    }

    #[inline]
    pub fn coding_path(&self) -> &CodingPath {
        &self.decoder.path
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_index >= self.elements.len()
    }

    fn current(&self) -> Result<DecodingContainer<'de>> {
        self.elements
            .get(self.current_index)
            .ok_or_else(|| Error::ExhaustedSequence {
                path: self.decoder.path.clone(),
            })
    }

    /// Decodes the next element.
    pub fn decode_next<T>(&mut self) -> Result<T>
    where
        T: Deserialize<'de>,
    {
        self.next_seed(PhantomData)
    }

    fn next_seed<S>(&mut self, seed: S) -> Result<S::Value>
    where
        S: DeserializeSeed<'de>,
    {
        let frame = self.current()?;
        let value = self.decoder.descend(
            CodingKey::Index(self.current_index),
            frame,
            |decoder| seed.deserialize(decoder),
        )?;
        self.current_index += 1;
        Ok(value)
    }

    /// Skips the next element if it is `NULL` and reports whether it did.
    pub fn decode_next_nil(&mut self) -> Result<bool> {
        let is_nil = self.current()?.is_null();
        if is_nil {
            self.current_index += 1;
        }
        Ok(is_nil)
    }

    /// Opens the next element as a map. The cursor moves past it only if it
    /// is one.
    pub fn open_nested_keyed(&mut self) -> Result<KeyedSource<'_, 'de>> {
        let frame = self.current()?;
        let source = self
            .decoder
            .open_nested_keyed(CodingKey::Index(self.current_index), frame)?;
        self.current_index += 1;
        Ok(source)
    }

    /// Opens the next element as a sequence.
    pub fn open_nested_unkeyed(&mut self) -> Result<UnkeyedSource<'_, 'de>> {
        let frame = self.current()?;
        let source = self
            .decoder
            .open_nested_unkeyed(CodingKey::Index(self.current_index), frame)?;
        self.current_index += 1;
        Ok(source)
    }
}

impl Drop for UnkeyedSource<'_, '_> {
    fn drop(&mut self) {
        if self.owns_frame {
            self.decoder.leave();
        }
    }
}

impl<'de> de::SeqAccess<'de> for UnkeyedSource<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.is_at_end() {
            return Ok(None);
        }
        self.next_seed(seed).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len().saturating_sub(self.current_index))
    }
}

/// Reads the scalar on top of the decoder's stack.
pub struct SingleSource<'a> {
    scalar: Scalar<'a>,
    path: &'a CodingPath,
}

#[derive(Clone, Copy)]
enum Scalar<'a> {
    Value(&'a AttributeValue),
    Member(TagID, &'a str),
}

impl<'a> SingleSource<'a> {
    pub(crate) fn new(value: &'a AttributeValue, path: &'a CodingPath) -> Self {
        Self {
            scalar: Scalar::Value(value),
            path,
        }
    }

    pub(crate) fn member(tag: TagID, text: &'a str, path: &'a CodingPath) -> Self {
        Self {
            scalar: Scalar::Member(tag, text),
            path,
        }
    }

    #[inline]
    pub fn tag(&self) -> TagID {
        match self.scalar {
            Scalar::Value(value) => value.tag(),
            Scalar::Member(tag, _) => tag,
        }
    }

    /// The scalar as an owned attribute value.
    pub fn to_attribute(&self) -> AttributeValue {
        match self.scalar {
            Scalar::Value(value) => value.clone(),
            Scalar::Member(TagID::Number, text) => AttributeValue::Number(text.to_owned()),
            Scalar::Member(_, text) => AttributeValue::String(text.to_owned()),
        }
    }

    pub(crate) fn mismatch(&self, expected: Shape) -> Error {
        Error::TypeMismatch {
            path: self.path.clone(),
            expected,
            actual: self.to_attribute(),
        }
    }

    fn text(&self, tag: TagID) -> Option<&'a str> {
        match self.scalar {
            Scalar::Value(AttributeValue::String(text)) if tag == TagID::String => Some(text.as_str()),
            Scalar::Value(AttributeValue::Number(text)) if tag == TagID::Number => Some(text.as_str()),
            Scalar::Member(member, text) if member == tag => Some(text),
            _ => None,
        }
    }

    pub fn read_bool(&self) -> Result<bool> {
        let value = match self.scalar {
            Scalar::Value(value) => value.as_bool(),
            Scalar::Member(..) => None,
        };
        value.ok_or_else(|| self.mismatch(Shape::Bool))
    }

    pub fn read_string(&self) -> Result<&'a str> {
        self.text(TagID::String)
            .ok_or_else(|| self.mismatch(Shape::String))
    }

    /// Parses the stored decimal text as `T`.
    ///
    /// ```
    /// use dynamo_codec::{AttributeValue, Error, from_attribute};
    ///
    /// let value = AttributeValue::number("300");
    /// assert_eq!(from_attribute::<u16>(&value).unwrap(), 300);
    /// assert!(matches!(
    ///     from_attribute::<u8>(&value),
    ///     Err(Error::NumberFormat { target: "u8", .. })
    /// ));
    /// ```
    pub fn read_number<T: FromStr>(&self) -> Result<T> {
        let raw = self
            .text(TagID::Number)
            .ok_or_else(|| self.mismatch(Shape::Number))?;
        raw.parse().map_err(|_| Error::NumberFormat {
            path: self.path.clone(),
            raw: raw.to_owned(),
            target: std::any::type_name::<T>(),
        })
    }

    pub fn read_binary(&self) -> Result<&'a Bytes> {
        let value = match self.scalar {
            Scalar::Value(value) => value.as_binary(),
            Scalar::Member(..) => None,
        };
        value.ok_or_else(|| self.mismatch(Shape::Binary))
    }

    #[inline]
    pub fn read_nil(&self) -> bool {
        matches!(self.scalar, Scalar::Value(value) if value.is_null())
    }
}
