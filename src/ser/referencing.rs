use std::ops::{Deref, DerefMut};

use tracing::trace;

use super::{EncodingContainer, Encoder};
use crate::{AttributeValue, CodingKey, Item};

/// Where a [`ReferencingEncoder`] writes its value once it is dropped.
#[derive(Debug)]
enum Reference {
    Keyed { slot: usize, key: String },
    Unkeyed { slot: usize, index: usize },
}

/// A child [`Encoder`] whose result is inserted into a container of its
/// parent when it goes out of scope.
///
/// Obtained from [`KeyedSink::super_encoder`](super::KeyedSink::super_encoder)
/// and [`UnkeyedSink::super_encoder`](super::UnkeyedSink::super_encoder). It
/// also backs enum variants that carry data, which are stored as a single-entry
/// map `{variant: payload}`.
///
/// The child starts with an empty stack and the parent's path extended by the
/// reference key. Dropping it commits:
///
/// - no container written: an empty `M`
/// - one container: that container, finalized
/// - more than one: panics
///
/// ```
/// use dynamo_codec::{AttributeValue, Encoder};
///
/// let mut encoder = Encoder::new();
/// let mut sink = encoder.begin_keyed();
/// {
///     let mut parent = sink.super_encoder();
///     parent.begin_single().write_string("base");
/// }
/// let value = encoder.finish();
/// let map = value.as_map().unwrap();
/// assert_eq!(map["super"], AttributeValue::from("base"));
/// ```
pub struct ReferencingEncoder<'a> {
    parent: &'a mut Encoder,
    reference: Reference,
    encoder: Encoder,
}

impl<'a> ReferencingEncoder<'a> {
    pub(crate) fn keyed(parent: &'a mut Encoder, slot: usize, key: String) -> Self {
        let encoder = Encoder::nested(parent.path.join(CodingKey::Key(key.clone())));
        Self {
            parent,
            reference: Reference::Keyed { slot, key },
            encoder,
        }
    }

    pub(crate) fn unkeyed(parent: &'a mut Encoder, slot: usize, index: usize) -> Self {
        let encoder = Encoder::nested(parent.path.join(CodingKey::Index(index)));
        Self {
            parent,
            reference: Reference::Unkeyed { slot, index },
            encoder,
        }
    }
}

impl Deref for ReferencingEncoder<'_> {
    type Target = Encoder;

    #[inline]
    fn deref(&self) -> &Encoder {
        &self.encoder
    }
}

impl DerefMut for ReferencingEncoder<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }
}

impl Drop for ReferencingEncoder<'_> {
    fn drop(&mut self) {
        let count = self.encoder.storage.len();
        if count > 1 {
            if std::thread::panicking() {
                return;
            }
            panic!(
                "referencing encoder at {} dropped with {count} containers, expected at most one",
                self.encoder.path
            );
        }
        let value = self
            .encoder
            .storage
            .pop()
            .map_or_else(|| AttributeValue::Map(Item::new()), EncodingContainer::finalize);
        match &mut self.reference {
            Reference::Keyed { slot, key } => {
                self.parent
                    .storage
                    .keyed_mut(*slot)
                    .insert(std::mem::take(key), value);
            }
            Reference::Unkeyed { slot, index } => {
                let elements = self.parent.storage.unkeyed_mut(*slot);
                let index = (*index).min(elements.len());
                elements.insert(index, value);
            }
        }
        trace!(path = %self.encoder.path, "committed referenced value");
    }
}
