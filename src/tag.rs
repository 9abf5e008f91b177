use std::fmt;

/// The storage kind of an [`AttributeValue`](crate::AttributeValue).
///
/// Each variant corresponds to one of the type descriptors used by the
/// key/value store's attribute format (`S`, `N`, `B`, ...).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TagID {
    String,
    Number,
    Binary,
    Bool,
    Null,
    StringSet,
    NumberSet,
    Map,
    List,
}

impl TagID {
    /// Returns the wire descriptor for this tag.
    ///
    /// # Example
    ///
    /// ```
    /// use dynamo_codec::TagID;
    ///
    /// assert_eq!(TagID::String.descriptor(), "S");
    /// assert_eq!(TagID::NumberSet.descriptor(), "NS");
    /// assert_eq!(TagID::Null.descriptor(), "NULL");
    /// ```
    pub const fn descriptor(self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::StringSet => "SS",
            Self::NumberSet => "NS",
            Self::Map => "M",
            Self::List => "L",
        }
    }

    /// Looks up a tag by its wire descriptor.
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        Some(match descriptor {
            "S" => Self::String,
            "N" => Self::Number,
            "B" => Self::Binary,
            "BOOL" => Self::Bool,
            "NULL" => Self::Null,
            "SS" => Self::StringSet,
            "NS" => Self::NumberSet,
            "M" => Self::Map,
            "L" => Self::List,
            _ => return None,
        })
    }

    /// Returns `true` if this is a scalar tag type.
    ///
    /// Scalar tags are: String, Number, Binary, Bool, Null.
    ///
    /// # Example
    ///
    /// ```
    /// use dynamo_codec::TagID;
    ///
    /// assert!(TagID::Number.is_scalar());
    /// assert!(TagID::Null.is_scalar());
    /// assert!(!TagID::StringSet.is_scalar());
    /// assert!(!TagID::Map.is_scalar());
    /// ```
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::String | Self::Number | Self::Binary | Self::Bool | Self::Null
        )
    }

    /// Returns `true` if this is a set tag type (StringSet, NumberSet).
    pub const fn is_set(self) -> bool {
        matches!(self, Self::StringSet | Self::NumberSet)
    }

    /// Returns `true` if this tag can be read as a sequence.
    ///
    /// Sequence tags are: List, StringSet, NumberSet.
    pub const fn is_sequence(self) -> bool {
        matches!(self, Self::List | Self::StringSet | Self::NumberSet)
    }

    /// Returns `true` if this is a composite tag type.
    ///
    /// Composite tags are: Map, List.
    /// These contain other attribute values as children.
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Map | Self::List)
    }
}

impl fmt::Display for TagID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}

/// The shape a decoder asked for when it found something else.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Shape {
    String,
    Number,
    Binary,
    Bool,
    Null,
    Map,
    /// A `List`, `StringSet` or `NumberSet`.
    Sequence,
    /// Any non-composite value.
    Scalar,
    /// A unit variant name or a single-entry map.
    Enum,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::String => "string (S)",
            Shape::Number => "number (N)",
            Shape::Binary => "binary (B)",
            Shape::Bool => "boolean (BOOL)",
            Shape::Null => "null (NULL)",
            Shape::Map => "map (M)",
            Shape::Sequence => "list or set (L, SS, NS)",
            Shape::Scalar => "scalar value",
            Shape::Enum => "enum variant",
        })
    }
}
