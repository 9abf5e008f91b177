//! The encoder's stack of in-progress containers.

use crate::{AttributeValue, Item};

/// Whether a finished sequence may be re-tagged as a set.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum ListMode {
    /// All-string or all-number sequences become `SS` / `NS`.
    #[default]
    Infer,
    /// Always `L`.
    List,
}

/// A container that is still being written.
#[derive(Debug)]
pub enum EncodingContainer {
    Single(AttributeValue),
    Keyed(Item),
    Unkeyed {
        elements: Vec<AttributeValue>,
        mode: ListMode,
    },
}

impl EncodingContainer {
    /// Converts the container into its final attribute value.
    ///
    /// This is where set inference happens for sequences in
    /// [`ListMode::Infer`].
    pub fn finalize(self) -> AttributeValue {
        match self {
            EncodingContainer::Single(value) => value,
            EncodingContainer::Keyed(map) => AttributeValue::Map(map),
            EncodingContainer::Unkeyed {
                elements,
                mode: ListMode::Infer,
            } => AttributeValue::List(elements).into_set(),
            EncodingContainer::Unkeyed {
                elements,
                mode: ListMode::List,
            } => AttributeValue::List(elements),
        }
    }
}

/// LIFO stack of [`EncodingContainer`]s. The top is the current position.
#[derive(Default, Debug)]
pub struct EncodingStorage {
    containers: Vec<EncodingContainer>,
}

impl EncodingStorage {
    pub const fn new() -> Self {
        Self {
            containers: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn top(&self) -> Option<&EncodingContainer> {
        self.containers.last()
    }

    /// Pushes an empty keyed container and returns its slot.
    pub(crate) fn push_keyed(&mut self) -> usize {
        self.containers.push(EncodingContainer::Keyed(Item::new()));
        self.containers.len() - 1
    }

    /// Pushes an empty unkeyed container and returns its slot.
    pub(crate) fn push_unkeyed(&mut self, mode: ListMode) -> usize {
        self.containers.push(EncodingContainer::Unkeyed {
            elements: Vec::new(),
            mode,
        });
        self.containers.len() - 1
    }

    pub(crate) fn push_single(&mut self, value: AttributeValue) {
        self.containers.push(EncodingContainer::Single(value));
    }

    pub(crate) fn pop(&mut self) -> Option<EncodingContainer> {
        self.containers.pop()
    }

    /// Pops the single container pushed above `depth`, if any.
    ///
    /// # Panics
    ///
    /// Panics if more than one container sits above `depth`.
    pub(crate) fn pop_to(&mut self, depth: usize) -> Option<EncodingContainer> {
        match self.containers.len().saturating_sub(depth) {
            0 => None,
            1 => self.containers.pop(),
            pushed => panic!("{pushed} containers were left above depth {depth}, expected one"),
        }
    }

    pub(crate) fn truncate(&mut self, depth: usize) {
        self.containers.truncate(depth);
    }

    pub(crate) fn keyed_mut(&mut self, slot: usize) -> &mut Item {
        match self.containers.get_mut(slot) {
            Some(EncodingContainer::Keyed(map)) => map,
            other => panic!("expected a keyed container at slot {slot}, found {other:?}"),
        }
    }

    pub(crate) fn unkeyed(&self, slot: usize) -> &[AttributeValue] {
        match self.containers.get(slot) {
            Some(EncodingContainer::Unkeyed { elements, .. }) => elements,
            other => panic!("expected an unkeyed container at slot {slot}, found {other:?}"),
        }
    }

    pub(crate) fn unkeyed_mut(&mut self, slot: usize) -> &mut Vec<AttributeValue> {
        match self.containers.get_mut(slot) {
            Some(EncodingContainer::Unkeyed { elements, .. }) => elements,
            other => panic!("expected an unkeyed container at slot {slot}, found {other:?}"),
        }
    }
}
