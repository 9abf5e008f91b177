//! Serde serialization into attribute values.
//!
//! The [`Encoder`] walks a value depth-first. Each value it visits pushes
//! exactly one container onto an explicit stack; the enclosing sink pops
//! that container, finalizes it and stores it under the current key or
//! index. Shapes follow the serde data model:
//!
//! | Rust | Attribute value |
//! |------|-----------------|
//! | `bool` | `BOOL` |
//! | integers, `f32`, `f64` | `N` (decimal text) |
//! | `char`, `&str`, `String` | `S` |
//! | `&[u8]` via `serde_bytes` | `B` |
//! | `None`, `()`, unit structs | `NULL` |
//! | `Some(v)`, newtype structs | same as `v` |
//! | unit variants | `S(variant)` |
//! | other variants | `M { variant: payload }` |
//! | `Vec<T>`, sets, sequences | `L`, or `SS` / `NS` when homogeneous |
//! | tuples, fixed-size arrays, tuple structs | `L` |
//! | structs, maps | `M` |
//!
//! Sequences whose elements are all strings or all numbers become string or
//! number sets. Wrap a field with
//! `#[serde(with = "dynamo_codec::list")]` to keep it a plain list.

use serde::{Serialize, ser};
use tracing::{debug, trace};

use crate::{AttributeValue, CodingKey, CodingPath, Error, Item, Result};

mod key;
mod referencing;
mod sink;
pub mod storage;

pub use referencing::ReferencingEncoder;
pub use sink::{KeyedSink, SingleSink, UnkeyedSink, VariantSink};
pub use storage::{EncodingContainer, EncodingStorage, ListMode};

/// Encoder implementing [`serde::Serializer`].
///
/// Most callers want [`to_item`], [`to_items`] or [`to_attribute`]. The
/// encoder is public for hand-written encodings that drive the sinks
/// directly.
///
/// ```
/// use dynamo_codec::{AttributeValue, Encoder};
///
/// let mut encoder = Encoder::new();
/// let mut sink = encoder.begin_keyed();
/// sink.write("name", "foo").unwrap();
/// sink.write("tags", &vec!["a", "b"]).unwrap();
/// sink.write_nil("gone");
///
/// let value = encoder.finish();
/// let item = value.as_map().unwrap();
/// assert_eq!(item["name"], AttributeValue::from("foo"));
/// assert_eq!(item["tags"].as_string_set(), Some(&["a".to_owned(), "b".to_owned()][..]));
/// assert!(item["gone"].is_null());
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    storage: EncodingStorage,
    path: CodingPath,
    base_depth: usize,
    list_mode: ListMode,
}

impl Encoder {
    /// Creates a root encoder with an empty stack and path.
    pub const fn new() -> Self {
        Self {
            storage: EncodingStorage::new(),
            path: CodingPath::new(),
            base_depth: 0,
            list_mode: ListMode::Infer,
        }
    }

    /// An encoder rooted at `path`, used by [`ReferencingEncoder`].
    fn nested(path: CodingPath) -> Self {
        Self {
            storage: EncodingStorage::new(),
            base_depth: path.len(),
            path,
            list_mode: ListMode::Infer,
        }
    }

    /// The path from the root to the value being written.
    #[inline]
    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    #[inline]
    pub fn storage(&self) -> &EncodingStorage {
        &self.storage
    }

    /// Whether the current path still has room for a container.
    ///
    /// Each path step owns at most one container, so this holds exactly when
    /// the stack is as deep as the path.
    #[inline]
    pub fn can_write_new_value(&self) -> bool {
        self.storage.len() + self.base_depth == self.path.len()
    }

    #[track_caller]
    fn assert_can_write(&self) {
        assert!(
            self.can_write_new_value(),
            "a value was already written at {}",
            self.path
        );
    }

    /// Starts a map at the current path.
    ///
    /// # Panics
    ///
    /// Panics if a container was already started at this path.
    #[track_caller]
    pub fn begin_keyed(&mut self) -> KeyedSink<'_> {
        self.assert_can_write();
        self.list_mode = ListMode::Infer;
        let slot = self.storage.push_keyed();
        KeyedSink::new(self, slot)
    }

    /// Starts a sequence at the current path.
    ///
    /// Homogeneous string or number sequences finalize as sets unless the
    /// value was wrapped with [`crate::list`].
    ///
    /// # Panics
    ///
    /// Panics if a container was already started at this path.
    #[track_caller]
    pub fn begin_unkeyed(&mut self) -> UnkeyedSink<'_> {
        let mode = std::mem::take(&mut self.list_mode);
        self.begin_unkeyed_with(mode)
    }

    #[track_caller]
    fn begin_unkeyed_with(&mut self, mode: ListMode) -> UnkeyedSink<'_> {
        self.assert_can_write();
        let slot = self.storage.push_unkeyed(mode);
        UnkeyedSink::new(self, slot)
    }

    /// Starts a scalar at the current path.
    ///
    /// # Panics
    ///
    /// Panics if a container was already started at this path.
    #[track_caller]
    pub fn begin_single(&mut self) -> SingleSink<'_> {
        self.assert_can_write();
        self.list_mode = ListMode::Infer;
        SingleSink::new(self)
    }

    /// Writes `NULL` at the current path.
    #[track_caller]
    pub fn write_nil(&mut self) {
        self.begin_single().write_nil();
    }

    /// Encodes `value` on a fresh stack level and returns its finalized form.
    ///
    /// A value that writes nothing encodes as an empty map. On failure the
    /// stack is truncated to where it was.
    pub fn encode_value<T>(&mut self, value: &T) -> Result<AttributeValue>
    where
        T: ?Sized + Serialize,
    {
        let depth = self.storage.len();
        if let Err(error) = value.serialize(&mut *self) {
            self.storage.truncate(depth);
            return Err(error);
        }
        Ok(self.storage.pop_to(depth).map_or_else(
            || AttributeValue::Map(Item::new()),
            EncodingContainer::finalize,
        ))
    }

    /// Consumes the encoder and returns the top-level value.
    ///
    /// An encoder that was never written to yields `NULL`.
    ///
    /// # Panics
    ///
    /// Panics if more than one container was left on the stack.
    pub fn finish(mut self) -> AttributeValue {
        self.storage
            .pop_to(0)
            .map_or(AttributeValue::Null, EncodingContainer::finalize)
    }

    /// Runs `f` with `key` pushed onto the path, popping it on every exit.
    fn descend<T>(&mut self, key: CodingKey, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.path.push(key);
        let result = f(self).map_err(|error| error.at_path(&self.path));
        self.path.pop();
        result
    }

    #[inline]
    fn write_float(&mut self, value: f64) -> Result<()> {
        self.begin_single().write_float(value)
    }

    /// Starts `{variant: payload}` and returns a deferred encoder for the payload.
    fn begin_variant(&mut self, variant: &'static str) -> ReferencingEncoder<'_> {
        let slot = self.begin_keyed().slot();
        ReferencingEncoder::keyed(self, slot, variant.to_owned())
    }
}

/// Encodes `value` as a single attribute value of any tag.
///
/// # Example
///
/// ```
/// use dynamo_codec::{AttributeValue, to_attribute};
///
/// assert_eq!(to_attribute(&20.05).unwrap(), AttributeValue::number("20.05"));
/// assert_eq!(to_attribute(&Option::<u8>::None).unwrap(), AttributeValue::Null);
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - A float is NaN or infinite ([`Error::NonFiniteNumber`])
/// - A map has a key with no string form ([`Error::KeyMustBeString`])
/// - A `Serialize` implementation reports a custom error ([`Error::Custom`])
pub fn to_attribute<T>(value: &T) -> Result<AttributeValue>
where
    T: ?Sized + Serialize,
{
    let mut encoder = Encoder::new();
    match value.serialize(&mut encoder) {
        Ok(()) => {
            let value = encoder.finish();
            trace!(tag = %value.tag(), "encoded attribute value");
            Ok(value)
        }
        Err(error) => {
            let error = error.at_path(&encoder.path);
            debug!(%error, "encoding failed");
            Err(error)
        }
    }
}

/// Encodes `value` as one item, the top-level map of a stored row.
///
/// # Example
///
/// ```
/// use dynamo_codec::{AttributeValue, to_item};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Simple {
///     name: String,
///     count: u32,
/// }
///
/// let item = to_item(&Simple { name: "foo".into(), count: 1 }).unwrap();
/// assert_eq!(item["name"], AttributeValue::from("foo"));
/// assert_eq!(item["count"], AttributeValue::number(1));
/// ```
///
/// # Errors
///
/// Besides the errors of [`to_attribute`], returns [`Error::NotAMap`] if the
/// value does not encode to a map.
pub fn to_item<T>(value: &T) -> Result<Item>
where
    T: ?Sized + Serialize,
{
    match to_attribute(value)? {
        AttributeValue::Map(item) => Ok(item),
        other => {
            let error = Error::NotAMap {
                path: CodingPath::new(),
                actual: other.tag(),
            };
            debug!(%error, "encoding failed");
            Err(error)
        }
    }
}

/// Encodes every value as an item, in order.
///
/// Errors carry the index of the offending value as the first path step.
pub fn to_items<I>(values: I) -> Result<Vec<Item>>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let mut encoder = Encoder::new();
    let written = {
        let mut sink = encoder.begin_unkeyed_with(ListMode::List);
        values.into_iter().try_for_each(|value| sink.write(&value))
    };
    if let Err(error) = written {
        debug!(%error, "batch encoding failed");
        return Err(error);
    }

    let elements = match encoder.finish() {
        AttributeValue::List(elements) => elements,
        other => vec![other],
    };
    let items = elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            AttributeValue::Map(item) => Ok(item),
            other => Err(Error::NotAMap {
                path: CodingPath::from(vec![CodingKey::Index(index)]),
                actual: other.tag(),
            }),
        })
        .collect::<Result<Vec<_>>>();
    match &items {
        Ok(items) => trace!(count = items.len(), "encoded items"),
        Err(error) => debug!(%error, "batch encoding failed"),
    }
    items
}

macro_rules! serialize_number {
    ($($method:ident: $ty:ty),* $(,)?) => {$(
        #[inline]
        fn $method(self, v: $ty) -> Result<()> {
            self.begin_single().write_number(v);
            Ok(())
        }
    )*};
}

impl<'a> ser::Serializer for &'a mut Encoder {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = UnkeyedSink<'a>;
    type SerializeTuple = UnkeyedSink<'a>;
    type SerializeTupleStruct = UnkeyedSink<'a>;
    type SerializeTupleVariant = VariantSink<'a>;
    type SerializeMap = KeyedSink<'a>;
    type SerializeStruct = KeyedSink<'a>;
    type SerializeStructVariant = VariantSink<'a>;

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<()> {
        self.begin_single().write_bool(v);
        Ok(())
    }

    serialize_number! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
    }

    #[cfg(feature = "i128")]
    #[inline]
    fn serialize_i128(self, v: i128) -> Result<()> {
        self.begin_single().write_number(v);
        Ok(())
    }

    #[cfg(feature = "i128")]
    #[inline]
    fn serialize_u128(self, v: u128) -> Result<()> {
        self.begin_single().write_number(v);
        Ok(())
    }

    #[inline]
    fn serialize_f32(self, v: f32) -> Result<()> {
        // widened only for the error, `20.05f32 as f64` prints `20.049999237060547`
        if !v.is_finite() {
            return self.write_float(f64::from(v));
        }
        self.begin_single().write_number(v);
        Ok(())
    }

    #[inline]
    fn serialize_f64(self, v: f64) -> Result<()> {
        self.write_float(v)
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<()> {
        self.begin_single().write_string(v);
        Ok(())
    }

    #[inline]
    fn serialize_str(self, v: &str) -> Result<()> {
        self.begin_single().write_string(v);
        Ok(())
    }

    #[inline]
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.begin_single().write_binary(v.to_vec());
        Ok(())
    }

    #[inline]
    fn serialize_none(self) -> Result<()> {
        self.write_nil();
        Ok(())
    }

    #[inline]
    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<()> {
        self.write_nil();
        Ok(())
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.write_nil();
        Ok(())
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.begin_single().write_string(variant);
        Ok(())
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match name {
            crate::list::TOKEN => {
                self.list_mode = ListMode::List;
                let result = value.serialize(&mut *self);
                self.list_mode = ListMode::Infer;
                result
            }
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let mut payload = self.begin_variant(variant);
        value
            .serialize(&mut *payload)
            .map_err(|error| error.at_path(&payload.path))
    }

    #[inline]
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(self.begin_unkeyed())
    }

    #[inline]
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self.begin_unkeyed_with(ListMode::List))
    }

    #[inline]
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self.begin_unkeyed_with(ListMode::List))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let mut payload = self.begin_variant(variant);
        let slot = payload.begin_unkeyed_with(ListMode::List).slot();
        Ok(VariantSink::new(payload, slot))
    }

    #[inline]
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(self.begin_keyed())
    }

    #[inline]
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self.begin_keyed())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let mut payload = self.begin_variant(variant);
        let slot = payload.begin_keyed().slot();
        Ok(VariantSink::new(payload, slot))
    }
}
