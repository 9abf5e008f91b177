
use serde::de::{self, DeserializeSeed};

use super::Decoder;
use super::storage::DecodingContainer;
use crate::{AttributeValue, CodingKey, Error, Result, Shape};

/// Enum access for a single-entry map `{variant: payload}`.
pub(crate) struct VariantSource<'a, 'de> {
    pub(crate) decoder: &'a mut Decoder<'de>,
    pub(crate) variant: &'de str,
    pub(crate) payload: &'de AttributeValue,
}

impl<'a, 'de> VariantSource<'a, 'de> {
    fn descend<T>(self, f: impl FnOnce(&mut Decoder<'de>) -> Result<T>) -> Result<T> {
        self.decoder.descend(
            CodingKey::from(self.variant),
            DecodingContainer::Single(self.payload),
            f,
        )
    }
}

impl<'a, 'de> de::EnumAccess<'de> for VariantSource<'a, 'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self)>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed
            .deserialize(de::value::BorrowedStrDeserializer::<Error>::new(self.variant))
            .map_err(|error| error.at_path(&self.decoder.path))?;
        Ok((variant, self))
    }
}

impl<'a, 'de> de::VariantAccess<'de> for VariantSource<'a, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        if self.payload.is_null() {
            return Ok(());
        }
        Err(Error::TypeMismatch {
            path: self.decoder.path.join(CodingKey::from(self.variant)),
            expected: Shape::Null,
            actual: self.payload.clone(),
        })
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        self.descend(|decoder| seed.deserialize(decoder))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.descend(|decoder| de::Deserializer::deserialize_seq(decoder, visitor))
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.descend(|decoder| de::Deserializer::deserialize_map(decoder, visitor))
    }
}
