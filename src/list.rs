//! Serde module that keeps a sequence as a plain `L`.
//!
//! By default a sequence whose elements are all strings finalizes as a string
//! set (`SS`) and one whose elements are all numbers as a number set (`NS`).
//! That suits most fields, but a set cannot hold duplicates once it reaches the
//! store, so ordered or repeating data should stay a list:
//!
//! ```
//! use dynamo_codec::{AttributeValue, from_item, to_item};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Route {
//!     tags: Vec<String>,
//!     #[serde(with = "dynamo_codec::list")]
//!     stops: Vec<String>,
//! }
//!
//! let route = Route {
//!     tags: vec!["express".into()],
//!     stops: vec!["a".into(), "b".into(), "a".into()],
//! };
//! let item = to_item(&route).unwrap();
//! assert_eq!(item["tags"], AttributeValue::StringSet(vec!["express".into()]));
//! assert!(matches!(item["stops"], AttributeValue::List(_)));
//! assert_eq!(from_item::<Route>(&item).unwrap(), route);
//! ```
//!
//! Only the outermost sequence is affected; nested sequences still infer.
//! Reading accepts lists and sets alike, so the module is symmetric with
//! plain `Vec<T>` on the way in.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) const TOKEN: &str = "dynamo_codec::list";

/// Serialize `value` so that its sequence is stored as `L`.
///
/// Other serializers see an ordinary newtype and serialize `value` unchanged.
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: ?Sized + Serialize,
    S: Serializer,
{
    serializer.serialize_newtype_struct(TOKEN, value)
}

/// Deserialize a `T` from an `L`, `SS` or `NS`.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer)
}
