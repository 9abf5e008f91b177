//! Serde codec between Rust values and DynamoDB-style attribute values.
//!
//! An [`AttributeValue`] is a tagged tree: strings (`S`), decimal-text numbers
//! (`N`), binary (`B`), booleans (`BOOL`), `NULL`, string and number sets
//! (`SS`, `NS`), maps (`M`) and lists (`L`). An [`Item`] is the top-level map
//! of one stored row.
//!
//! ```
//! use dynamo_codec::{AttributeValue, from_item, to_item};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Foo {
//!     name: String,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Bar {
//!     foo: Foo,
//!     number: i64,
//! }
//!
//! let bar = Bar { foo: Foo { name: "Foo".into() }, number: 42 };
//! let item = to_item(&bar).unwrap();
//! assert_eq!(item["number"], AttributeValue::number(42));
//! assert_eq!(item["foo"].as_map().unwrap()["name"], AttributeValue::from("Foo"));
//! assert_eq!(from_item::<Bar>(&item).unwrap(), bar);
//! ```
//!
//! The [`ser`] and [`de`] modules describe the mapping in each direction.
//! Failures carry the [`CodingPath`] at which they happened; see [`Error`].

pub mod de;
pub mod error;
pub mod list;
mod path;
pub mod ser;
mod tag;
mod value;

pub use de::{Decoder, from_attribute, from_item, from_items};
pub use error::{Error, Result};
pub use path::*;
pub use ser::{Encoder, to_attribute, to_item, to_items};
pub use tag::*;
pub use value::*;
