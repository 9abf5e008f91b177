//! The decoder's stack of frames over the input.

use crate::{AttributeValue, Item, TagID};

/// One frame of the decoding stack.
///
/// Every frame borrows from the input. Set members have no attribute value of
/// their own, so they are read as [`Member`](DecodingContainer::Member)
/// frames over the set's text.
#[derive(Clone, Debug)]
pub enum DecodingContainer<'de> {
    Single(&'de AttributeValue),
    /// One member of a string or number set.
    Member { tag: TagID, text: &'de str },
    Keyed(&'de Item),
    Unkeyed(Elements<'de>),
}

impl<'de> DecodingContainer<'de> {
    /// The tag this frame would have as a stored value.
    pub fn tag(&self) -> TagID {
        match self {
            DecodingContainer::Single(value) => value.tag(),
            DecodingContainer::Member { tag, .. } => *tag,
            DecodingContainer::Keyed(_) => TagID::Map,
            DecodingContainer::Unkeyed(_) => TagID::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DecodingContainer::Single(value) if value.is_null())
    }

    /// Materializes the frame as an owned attribute value.
    pub fn to_attribute(&self) -> AttributeValue {
        match self {
            DecodingContainer::Single(value) => (*value).clone(),
            DecodingContainer::Member { tag, text } => member(*tag, text),
            DecodingContainer::Keyed(map) => AttributeValue::Map((*map).clone()),
            DecodingContainer::Unkeyed(elements) => elements.to_attribute(),
        }
    }
}

fn member(tag: TagID, text: &str) -> AttributeValue {
    match tag {
        TagID::Number => AttributeValue::Number(text.to_owned()),
        _ => AttributeValue::String(text.to_owned()),
    }
}

/// The members of an unkeyed frame.
#[derive(Clone, Debug)]
pub enum Elements<'de> {
    Values(&'de [AttributeValue]),
    /// The members of a string or number set. `tag` is the member tag, `S` or
    /// `N`.
    Members { tag: TagID, members: &'de [String] },
    /// A batch of items, as passed to [`from_items`](crate::from_items).
    Items(&'de [Item]),
}

impl<'de> Elements<'de> {
    /// Reads `value` as a sequence. Sets yield their members in stored order.
    pub(crate) fn of(value: &'de AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::List(values) => Some(Elements::Values(values.as_slice())),
            AttributeValue::StringSet(members) => Some(Elements::Members {
                tag: TagID::String,
                members: members.as_slice(),
            }),
            AttributeValue::NumberSet(members) => Some(Elements::Members {
                tag: TagID::Number,
                members: members.as_slice(),
            }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Elements::Values(values) => values.len(),
            Elements::Members { members, .. } => members.len(),
            Elements::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The frame for the element at `index`.
    pub fn get(&self, index: usize) -> Option<DecodingContainer<'de>> {
        match *self {
            Elements::Values(values) => values.get(index).map(DecodingContainer::Single),
            Elements::Members { tag, members } => members.get(index).map(|text| {
                DecodingContainer::Member {
                    tag,
                    text: text.as_str(),
                }
            }),
            Elements::Items(items) => items.get(index).map(DecodingContainer::Keyed),
        }
    }

    fn to_attribute(&self) -> AttributeValue {
        match self {
            Elements::Values(values) => AttributeValue::List(values.to_vec()),
            Elements::Members { tag, members } => AttributeValue::List(
                members.iter().map(|text| member(*tag, text)).collect(),
            ),
            Elements::Items(items) => AttributeValue::List(
                items
                    .iter()
                    .map(|item| AttributeValue::Map(item.clone()))
                    .collect(),
            ),
        }
    }
}

/// LIFO stack of [`DecodingContainer`]s. The root frame is never popped.
#[derive(Debug)]
pub struct DecodingStorage<'de> {
    root: DecodingContainer<'de>,
    containers: Vec<DecodingContainer<'de>>,
}

impl<'de> DecodingStorage<'de> {
    pub fn new(root: DecodingContainer<'de>) -> Self {
        Self {
            root,
            containers: Vec::new(),
        }
    }

    /// Number of frames, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.containers.len() + 1
    }

    #[inline]
    pub fn top(&self) -> &DecodingContainer<'de> {
        self.containers.last().unwrap_or(&self.root)
    }

    /// The attribute value of the top frame, if it is a stored scalar.
    pub(crate) fn top_value(&self) -> Option<&'de AttributeValue> {
        match self.top() {
            DecodingContainer::Single(value) => Some(*value),
            _ => None,
        }
    }

    /// The text of the top frame if it is a string, set members included.
    pub(crate) fn top_str(&self) -> Option<&'de str> {
        match *self.top() {
            DecodingContainer::Single(AttributeValue::String(text)) => Some(text.as_str()),
            DecodingContainer::Member {
                tag: TagID::String,
                text,
            } => Some(text),
            _ => None,
        }
    }

    pub(crate) fn push(&mut self, container: DecodingContainer<'de>) {
        self.containers.push(container);
    }

    pub(crate) fn pop(&mut self) -> Option<DecodingContainer<'de>> {
        self.containers.pop()
    }
}
