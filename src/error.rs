//! Error types for encoding and decoding attribute values.
//!
//! This module contains the [`Error`] type which represents all possible errors
//! that can occur when converting between Rust values and
//! [`AttributeValue`](crate::AttributeValue)s.
//!
//! # Example
//!
//! ```
//! use dynamo_codec::{AttributeValue, CodingKey, Error, Item, Shape, from_item};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Flags {
//!     bool: bool,
//! }
//!
//! let mut item = Item::new();
//! item.insert("bool".into(), AttributeValue::from("foo"));
//!
//! match from_item::<Flags>(&item) {
//!     Err(Error::TypeMismatch { path, expected, actual }) => {
//!         assert_eq!(path.as_slice(), &[CodingKey::from("bool")]);
//!         assert_eq!(expected, Shape::Bool);
//!         assert_eq!(actual, AttributeValue::from("foo"));
//!     }
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

use std::fmt::{self, Display};

use serde::{de, ser};

use crate::{AttributeValue, CodingPath, Shape, TagID};

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// This type represents all possible errors that can occur when encoding or
/// decoding attribute values.
///
/// Every variant that depends on input data records the [`CodingPath`] at
/// which it occurred. Violations of the engine's own invariants (writing two
/// values at one path, for instance) are programming errors and panic instead.
#[derive(Debug)]
pub enum Error {
    /// The stored value does not have the shape the decoder asked for.
    TypeMismatch {
        path: CodingPath,
        expected: Shape,
        actual: AttributeValue,
    },

    /// A keyed decode requested a key that is not present.
    KeyNotFound { path: CodingPath, key: String },

    /// An unkeyed decode requested an element past the end of the sequence.
    ExhaustedSequence { path: CodingPath },

    /// The stored decimal text does not parse as the requested numeric type.
    NumberFormat {
        path: CodingPath,
        raw: String,
        target: &'static str,
    },

    /// A floating point value is NaN or infinite and has no decimal form.
    NonFiniteNumber { path: CodingPath, value: String },

    /// Map keys must be strings (or values with an obvious string form).
    KeyMustBeString { path: CodingPath },

    /// The value was expected to encode to a map but produced another tag.
    NotAMap { path: CodingPath, actual: TagID },

    /// A message raised by a `Serialize` or `Deserialize` implementation.
    ///
    /// The path is filled in by the innermost engine frame that observes the
    /// error.
    Custom {
        path: Option<CodingPath>,
        message: String,
    },
}

impl Error {
    /// Returns the coding path recorded for this error, if any.
    pub fn path(&self) -> Option<&CodingPath> {
        match self {
            Error::TypeMismatch { path, .. }
            | Error::KeyNotFound { path, .. }
            | Error::ExhaustedSequence { path }
            | Error::NumberFormat { path, .. }
            | Error::NonFiniteNumber { path, .. }
            | Error::KeyMustBeString { path }
            | Error::NotAMap { path, .. } => Some(path),
            Error::Custom { path, .. } => path.as_ref(),
        }
    }

    /// Records `path` on a [`Custom`](Error::Custom) error that does not have one yet.
    pub(crate) fn at_path(self, path: &CodingPath) -> Self {
        match self {
            Error::Custom {
                path: None,
                message,
            } => Error::Custom {
                path: Some(path.clone()),
                message,
            },
            error => error,
        }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom {
            path: None,
            message: msg.to_string(),
        }
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom {
            path: None,
            message: msg.to_string(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TypeMismatch {
                path,
                expected,
                actual,
            } => write!(
                formatter,
                "type mismatch at {path}: expected {expected}, found {}",
                actual.tag()
            ),
            Error::KeyNotFound { path, key } => {
                write!(formatter, "key not found at {path}: {key:?}")
            }
            Error::ExhaustedSequence { path } => {
                write!(formatter, "sequence exhausted at {path}")
            }
            Error::NumberFormat { path, raw, target } => write!(
                formatter,
                "invalid number at {path}: {raw:?} is not a valid {target}"
            ),
            Error::NonFiniteNumber { path, value } => write!(
                formatter,
                "non-finite number at {path}: {value} cannot be stored"
            ),
            Error::KeyMustBeString { path } => {
                write!(formatter, "map key must be a string at {path}")
            }
            Error::NotAMap { path, actual } => {
                write!(formatter, "expected a map at {path}, found {actual}")
            }
            Error::Custom {
                path: Some(path),
                message,
            } => write!(formatter, "{message} at {path}"),
            Error::Custom {
                path: None,
                message,
            } => formatter.write_str(message),
        }
    }
}

impl std::error::Error for Error {}
