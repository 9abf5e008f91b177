use serde::{Serialize, ser};

use crate::{CodingPath, Error, Result};

/// Turns a map key into the `String` used as the attribute name.
///
/// Strings, chars, integers, bools and unit variants have an obvious textual
/// form. Everything else is rejected with [`Error::KeyMustBeString`].
pub(crate) struct MapKeySerializer<'a> {
    pub(crate) path: &'a CodingPath,
}

impl MapKeySerializer<'_> {
    #[cold]
    fn reject(&self) -> Error {
        Error::KeyMustBeString {
            path: self.path.clone(),
        }
    }
}

macro_rules! display_key {
    ($($method:ident: $ty:ty),* $(,)?) => {$(
        #[inline]
        fn $method(self, v: $ty) -> Result<String> {
            Ok(v.to_string())
        }
    )*};
}

impl<'a> ser::Serializer for MapKeySerializer<'a> {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    #[inline]
    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_owned())
    }

    display_key! {
        serialize_bool: bool,
        serialize_char: char,
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
    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    #[cfg(feature = "i128")]
    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_none(self) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(self.reject())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(self.reject())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(self.reject())
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_owned())
    }

    #[inline]
    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(self.reject())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.reject())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.reject())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.reject())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.reject())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.reject())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.reject())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.reject())
    }
}
