//! Write handles for the container on top of the encoder's stack.
//!
//! A sink is just the encoder plus the stack slot of the container it owns, so
//! handing one out allocates nothing. Every nested write extends the coding
//! path by one key or index, encodes the value on a fresh stack level and pops
//! the path again whether or not the write succeeded.

use std::fmt::Display;

use bytes::Bytes;
use serde::{Serialize, ser};

use super::key::MapKeySerializer;
use super::{Encoder, ReferencingEncoder};
use crate::{AttributeValue, CodingKey, Error, Result};

/// Writes entries into a keyed (`M`) container.
pub struct KeyedSink<'a> {
    encoder: &'a mut Encoder,
    slot: usize,
    pending_key: Option<String>,
}

impl<'a> KeyedSink<'a> {
    pub(crate) fn new(encoder: &'a mut Encoder, slot: usize) -> Self {
        Self {
            encoder,
            slot,
            pending_key: None,
        }
    }

    /// The stack slot of the container this sink writes into.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Encodes `value` and stores it under `key`, replacing any previous entry.
    pub fn write<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let encoded = self
            .encoder
            .descend(CodingKey::from(key), |encoder| encoder.encode_value(value))?;
        self.encoder
            .storage
            .keyed_mut(self.slot)
            .insert(key.to_owned(), encoded);
        Ok(())
    }

    /// Stores an explicit `NULL` under `key`.
    pub fn write_nil(&mut self, key: &str) {
        self.encoder
            .storage
            .keyed_mut(self.slot)
            .insert(key.to_owned(), AttributeValue::Null);
    }

    /// A deferred encoder that writes under the key `"super"`.
    pub fn super_encoder(&mut self) -> ReferencingEncoder<'_> {
        self.super_encoder_for(CodingKey::SUPER)
    }

    /// A deferred encoder that writes under `key` once dropped.
    pub fn super_encoder_for(&mut self, key: &str) -> ReferencingEncoder<'_> {
        ReferencingEncoder::keyed(self.encoder, self.slot, key.to_owned())
    }

    /// Stores a map under `key` and lets `f` fill it in.
    ///
    /// The map is stored with whatever `f` wrote, even if `f` fails.
    ///
    /// ```
    /// use dynamo_codec::{AttributeValue, Encoder};
    ///
    /// let mut encoder = Encoder::new();
    /// let mut sink = encoder.begin_keyed();
    /// sink.nested_keyed("foo", |foo| foo.write("name", "Foo")).unwrap();
    /// let value = encoder.finish();
    /// let foo = value.as_map().unwrap()["foo"].as_map().unwrap();
    /// assert_eq!(foo["name"], AttributeValue::from("Foo"));
    /// ```
    pub fn nested_keyed<F>(&mut self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut KeyedSink<'_>) -> Result<()>,
    {
        let mut reference = self.super_encoder_for(key);
        let mut nested = reference.begin_keyed();
        f(&mut nested)
    }

    /// Stores a sequence under `key` and lets `f` fill it in.
    pub fn nested_unkeyed<F>(&mut self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut UnkeyedSink<'_>) -> Result<()>,
    {
        let mut reference = self.super_encoder_for(key);
        let mut nested = reference.begin_unkeyed();
        f(&mut nested)
    }
}

impl ser::SerializeStruct for KeyedSink<'_> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.write(key, value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeMap for KeyedSink<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        debug_assert!(
            self.pending_key.is_none(),
            "serialize_key called twice without serialize_value"
        );
        self.pending_key = Some(key.serialize(MapKeySerializer {
            path: &self.encoder.path,
        })?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match self.pending_key.take() {
            Some(key) => self.write(&key, value),
            None => Err(ser::Error::custom(
                "serialize_value called without serialize_key",
            )),
        }
    }

    fn serialize_entry<K, V>(&mut self, key: &K, value: &V) -> Result<()>
    where
        K: ?Sized + Serialize,
        V: ?Sized + Serialize,
    {
        let key = key.serialize(MapKeySerializer {
            path: &self.encoder.path,
        })?;
        self.write(&key, value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Appends elements to an unkeyed (`L`) container.
pub struct UnkeyedSink<'a> {
    encoder: &'a mut Encoder,
    slot: usize,
}

impl<'a> UnkeyedSink<'a> {
    pub(crate) fn new(encoder: &'a mut Encoder, slot: usize) -> Self {
        Self { encoder, slot }
    }

    /// The stack slot of the container this sink writes into.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Number of elements written so far.
    pub fn count(&self) -> usize {
        self.encoder.storage.unkeyed(self.slot).len()
    }

    /// Encodes `value` and appends it.
    pub fn write<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let index = self.count();
        let encoded = self
            .encoder
            .descend(CodingKey::Index(index), |encoder| encoder.encode_value(value))?;
        self.encoder.storage.unkeyed_mut(self.slot).push(encoded);
        Ok(())
    }

    /// Appends an explicit `NULL`.
    pub fn write_nil(&mut self) {
        self.encoder
            .storage
            .unkeyed_mut(self.slot)
            .push(AttributeValue::Null);
    }

    /// A deferred encoder whose value is inserted at the current count once
    /// dropped.
    pub fn super_encoder(&mut self) -> ReferencingEncoder<'_> {
        let index = self.count();
        ReferencingEncoder::unkeyed(self.encoder, self.slot, index)
    }

    /// Appends a map and lets `f` fill it in.
    pub fn nested_keyed<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut KeyedSink<'_>) -> Result<()>,
    {
        let mut reference = self.super_encoder();
        let mut nested = reference.begin_keyed();
        f(&mut nested)
    }

    /// Appends a sequence and lets `f` fill it in.
    pub fn nested_unkeyed<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut UnkeyedSink<'_>) -> Result<()>,
    {
        let mut reference = self.super_encoder();
        let mut nested = reference.begin_unkeyed();
        f(&mut nested)
    }
}

impl ser::SerializeSeq for UnkeyedSink<'_> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.write(value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTuple for UnkeyedSink<'_> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.write(value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for UnkeyedSink<'_> {
    type Ok = ();
    type Error = Error;

    #[inline]
    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.write(value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Writes exactly one scalar at the encoder's current position.
pub struct SingleSink<'a> {
    encoder: &'a mut Encoder,
}

impl<'a> SingleSink<'a> {
    pub(crate) fn new(encoder: &'a mut Encoder) -> Self {
        Self { encoder }
    }

    /// Pushes an already built attribute value.
    pub fn write(self, value: AttributeValue) {
        self.encoder.storage.push_single(value);
    }

    pub fn write_nil(self) {
        self.write(AttributeValue::Null)
    }

    pub fn write_bool(self, value: bool) {
        self.write(AttributeValue::Bool(value))
    }

    pub fn write_string(self, value: impl Into<String>) {
        self.write(AttributeValue::String(value.into()))
    }

    /// Stores the decimal form of an integer or other exact number.
    pub fn write_number(self, value: impl Display) {
        self.write(AttributeValue::number(value))
    }

    /// Stores a float, rejecting NaN and the infinities.
    pub fn write_float(self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::NonFiniteNumber {
                path: self.encoder.path.clone(),
                value: value.to_string(),
            });
        }
        self.write_number(value);
        Ok(())
    }

    pub fn write_binary(self, value: impl Into<Bytes>) {
        self.write(AttributeValue::Binary(value.into()))
    }
}

/// Writes the payload of a tuple or struct enum variant.
///
/// The variant is stored as `{variant: payload}`; the payload is built in a
/// [`ReferencingEncoder`] keyed by the variant name and committed by [`end`].
///
/// [`end`]: ser::SerializeStructVariant::end
pub struct VariantSink<'a> {
    reference: ReferencingEncoder<'a>,
    slot: usize,
}

impl<'a> VariantSink<'a> {
    pub(crate) fn new(reference: ReferencingEncoder<'a>, slot: usize) -> Self {
        Self { reference, slot }
    }
}

impl ser::SerializeTupleVariant for VariantSink<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        UnkeyedSink::new(&mut self.reference, self.slot).write(value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for VariantSink<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        KeyedSink::new(&mut self.reference, self.slot).write(key, value)
    }

    #[inline]
    fn end(self) -> Result<()> {
        Ok(())
    }
}
