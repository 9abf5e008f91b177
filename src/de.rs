//! Serde deserialization from attribute values.
//!
//! The [`Decoder`] keeps a stack of frames over the input. Each nested value
//! is decoded by pushing its frame and path step, running the value's
//! `Deserialize` implementation, then popping both again, on failure as well
//! as on success.
//!
//! # Quick Start
//!
//! ```
//! use dynamo_codec::{AttributeValue, Item, from_item};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Simple {
//!     name: String,
//!     count: u32,
//!     tags: Vec<String>,
//! }
//!
//! let mut item = Item::new();
//! item.insert("name".into(), AttributeValue::from("foo"));
//! item.insert("count".into(), AttributeValue::number(3));
//! item.insert("tags".into(), AttributeValue::StringSet(vec!["a".into(), "b".into()]));
//!
//! let simple: Simple = from_item(&item).unwrap();
//! assert_eq!(simple.name, "foo");
//! assert_eq!(simple.count, 3);
//! assert_eq!(simple.tags, ["a", "b"]);
//! ```
//!
//! # Attribute Value to Rust Type Mapping
//!
//! | Tag | Rust Types |
//! |-----|------------|
//! | `S` | `&str`, `String`, `char`, unit enum variants |
//! | `N` | every integer width, `f32`, `f64` |
//! | `B` | `&[u8]` / `Vec<u8>` (with `serde_bytes`), `Bytes` |
//! | `BOOL` | `bool` |
//! | `NULL` | `None`, `()`, unit structs |
//! | `SS`, `NS`, `L` | `Vec<T>`, `[T; N]`, tuples, sets |
//! | `M` | structs, maps, data-carrying enum variants |
//!
//! Strings and byte slices are borrowed from the input, set members
//! included, so `Vec<&str>` can borrow from an `SS`.


use serde::de::{self, Deserialize};
use tracing::{debug, trace};

use crate::{AttributeValue, CodingKey, CodingPath, Error, Item, Result, Shape, TagID};

mod key;
mod source;
pub mod storage;
mod variant;

pub use source::{KeyedSource, SingleSource, UnkeyedSource};
pub use storage::{DecodingContainer, DecodingStorage, Elements};
use variant::VariantSource;

/// Decoder implementing [`serde::Deserializer`].
///
/// For most use cases, prefer [`from_item`], [`from_items`] or
/// [`from_attribute`] rather than using this type directly.
#[derive(Debug)]
pub struct Decoder<'de> {
    storage: DecodingStorage<'de>,
    path: CodingPath,
}

impl<'de> Decoder<'de> {
    /// Creates a decoder whose root frame is `container`.
    pub fn new(container: DecodingContainer<'de>) -> Self {
        Self {
            storage: DecodingStorage::new(container),
            path: CodingPath::new(),
        }
    }

    /// The path from the root to the frame being read.
    #[inline]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    #[inline]
    pub fn storage(&self) -> &DecodingStorage<'de> {
        &self.storage
    }

    /// The frame on top of the stack.
    #[inline]
    pub fn current(&self) -> &DecodingContainer<'de> {
        self.storage.top()
    }

    #[cold]
    fn type_mismatch(&self, expected: Shape) -> Error {
        Error::TypeMismatch {
            path: self.path.clone(),
            expected,
            actual: self.current().to_attribute(),
        }
    }

    fn keyed_map(&self) -> Result<&'de Item> {
        if let DecodingContainer::Keyed(map) = self.storage.top() {
            return Ok(*map);
        }
        match self.storage.top_value() {
            Some(AttributeValue::Map(map)) => Ok(map),
            _ => Err(self.type_mismatch(Shape::Map)),
        }
    }

    fn unkeyed_elements(&self) -> Result<Elements<'de>> {
        let elements = match self.storage.top() {
            DecodingContainer::Unkeyed(elements) => Some(elements.clone()),
            DecodingContainer::Single(value) => Elements::of(*value),
            DecodingContainer::Member { .. } | DecodingContainer::Keyed(_) => None,
        };
        elements.ok_or_else(|| self.type_mismatch(Shape::Sequence))
    }

    /// Reads the current frame as a map.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the frame is a map.
    pub fn open_keyed(&mut self) -> Result<KeyedSource<'_, 'de>> {
        let map = self.keyed_map()?;
        Ok(KeyedSource::new(self, map, false))
    }

    /// Reads the current frame as a sequence. Sets read as sequences of their
    /// members.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the frame is a list or a set.
    pub fn open_unkeyed(&mut self) -> Result<UnkeyedSource<'_, 'de>> {
        let elements = self.unkeyed_elements()?;
        Ok(UnkeyedSource::new(self, elements, false))
    }

    /// Reads the current frame as a scalar.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if the frame is a map, a list or a set.
    pub fn open_single(&self) -> Result<SingleSource<'_>> {
        self.single(Shape::Scalar)
    }

    /// Like [`open_single`](Self::open_single), reporting `expected` when the
    /// frame is not a scalar.
    fn single(&self, expected: Shape) -> Result<SingleSource<'_>> {
        match *self.storage.top() {
            DecodingContainer::Single(value) if value.tag().is_scalar() => {
                Ok(SingleSource::new(value, &self.path))
            }
            DecodingContainer::Member { tag, text } => {
                Ok(SingleSource::member(tag, text, &self.path))
            }
            _ => Err(self.type_mismatch(expected)),
        }
    }

    /// Decodes the current frame as `T`.
    pub fn decode<T>(&mut self) -> Result<T>
    where
        T: Deserialize<'de>,
    {
        T::deserialize(self)
    }

    fn enter(&mut self, key: CodingKey, container: DecodingContainer<'de>) {
        self.storage.push(container);
        self.path.push(key);
    }

    fn leave(&mut self) {
        self.storage.pop();
        self.path.pop();
    }

    /// Runs `f` on `container` with `key` pushed onto the path, popping both
    /// on every exit.
    fn descend<T>(
        &mut self,
        key: CodingKey,
        container: DecodingContainer<'de>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.enter(key, container);
        let result = f(self).map_err(|error| error.at_path(&self.path));
        self.leave();
        result
    }

    fn open_nested_keyed(
        &mut self,
        key: CodingKey,
        container: DecodingContainer<'de>,
    ) -> Result<KeyedSource<'_, 'de>> {
        self.enter(key, container);
        match self.keyed_map() {
            Ok(map) => Ok(KeyedSource::new(self, map, true)),
            Err(error) => {
                self.leave();
                Err(error)
            }
        }
    }

    fn open_nested_unkeyed(
        &mut self,
        key: CodingKey,
        container: DecodingContainer<'de>,
    ) -> Result<UnkeyedSource<'_, 'de>> {
        self.enter(key, container);
        match self.unkeyed_elements() {
            Ok(elements) => Ok(UnkeyedSource::new(self, elements, true)),
            Err(error) => {
                self.leave();
                Err(error)
            }
        }
    }

    fn decode_root<T>(mut self) -> Result<T>
    where
        T: Deserialize<'de>,
    {
        T::deserialize(&mut self).map_err(|error| {
            let error = error.at_path(&self.path);
            debug!(%error, "decoding failed");
            error
        })
    }
}

/// Decodes a `T` from a single attribute value of any tag.
///
/// # Example
///
/// ```
/// use dynamo_codec::{AttributeValue, from_attribute};
///
/// assert_eq!(from_attribute::<f64>(&AttributeValue::number("20.05")).unwrap(), 20.05);
/// assert_eq!(from_attribute::<Option<bool>>(&AttributeValue::Null).unwrap(), None);
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - A value has the wrong tag for the requested type ([`Error::TypeMismatch`])
/// - A required key is absent ([`Error::KeyNotFound`] or a missing-field [`Error::Custom`])
/// - A number does not fit the requested type ([`Error::NumberFormat`])
pub fn from_attribute<'de, T>(value: &'de AttributeValue) -> Result<T>
where
    T: Deserialize<'de>,
{
    trace!(tag = %value.tag(), "decoding attribute value");
    Decoder::new(DecodingContainer::Single(value)).decode_root()
}

/// Decodes a `T` from one item.
pub fn from_item<'de, T>(item: &'de Item) -> Result<T>
where
    T: Deserialize<'de>,
{
    trace!(len = item.len(), "decoding item");
    Decoder::new(DecodingContainer::Keyed(item)).decode_root()
}

/// Decodes every item as a `T`, in order.
///
/// Errors carry the index of the offending item as the first path step.
pub fn from_items<'de, T>(items: &'de [Item]) -> Result<Vec<T>>
where
    T: Deserialize<'de>,
{
    trace!(count = items.len(), "decoding items");
    Decoder::new(DecodingContainer::Unkeyed(Elements::Items(items))).decode_root()
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            let value: $ty = self.single(Shape::Number)?.read_number()?;
            visitor.$visit(value)
        }
    )*};
}

impl<'de> de::Deserializer<'de> for &mut Decoder<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.current().tag() {
            TagID::String => self.deserialize_str(visitor),
            TagID::Number => {
                let source = self.single(Shape::Number)?;
                if let Ok(value) = source.read_number::<u64>() {
                    return visitor.visit_u64(value);
                }
                if let Ok(value) = source.read_number::<i64>() {
                    return visitor.visit_i64(value);
                }
                visitor.visit_f64(source.read_number()?)
            }
            TagID::Binary => self.deserialize_bytes(visitor),
            TagID::Bool => self.deserialize_bool(visitor),
            TagID::Null => visitor.visit_unit(),
            TagID::StringSet | TagID::NumberSet | TagID::List => self.deserialize_seq(visitor),
            TagID::Map => self.deserialize_map(visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(self.single(Shape::Bool)?.read_bool()?)
    }

    deserialize_number! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    #[cfg(feature = "i128")]
    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_i128(self.single(Shape::Number)?.read_number()?)
    }

    #[cfg(feature = "i128")]
    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_u128(self.single(Shape::Number)?.read_number()?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let text = self.single(Shape::String)?.read_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Str(text),
                &"a single character",
            )),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(text) = self.storage.top_str() {
            return visitor.visit_borrowed_str(text);
        }
        Err(self.type_mismatch(Shape::String))
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(AttributeValue::Binary(value)) = self.storage.top_value() {
            return visitor.visit_borrowed_bytes(value);
        }
        Err(self.type_mismatch(Shape::Binary))
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.current().is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let source = self.single(Shape::Null)?;
        if !source.read_nil() {
            return Err(source.mismatch(Shape::Null));
        }
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(self.open_unkeyed()?)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(self.open_keyed()?)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(variant) = self.storage.top_str() {
            return visitor.visit_enum(de::value::BorrowedStrDeserializer::new(variant));
        }

        let map = self
            .keyed_map()
            .map_err(|_| self.type_mismatch(Shape::Enum))?;
        let mut entries = map.iter();
        match (entries.next(), entries.next()) {
            (Some((variant, payload)), None) => visitor.visit_enum(VariantSource {
                decoder: self,
                variant,
                payload,
            }),
            _ => Err(self.type_mismatch(Shape::Enum)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}
