//! Coding paths.
//!
//! A [`CodingPath`] records the keys and indices an encoder or decoder has
//! descended through. Every error that depends on input data carries the
//! path at which it happened.

use std::{fmt, ops::Deref};

/// One step of a [`CodingPath`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum CodingKey {
    /// A map key or struct field name.
    Key(String),
    /// A position inside a list or set.
    Index(usize),
}

impl CodingKey {
    /// Key used by [`KeyedSink::super_encoder`](crate::ser::KeyedSink::super_encoder).
    pub const SUPER: &'static str = "super";

    pub fn as_key(&self) -> Option<&str> {
        match self {
            CodingKey::Key(key) => Some(key),
            CodingKey::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            CodingKey::Key(_) => None,
            CodingKey::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for CodingKey {
    fn from(key: &str) -> Self {
        CodingKey::Key(key.to_owned())
    }
}

impl From<String> for CodingKey {
    fn from(key: String) -> Self {
        CodingKey::Key(key)
    }
}

impl From<usize> for CodingKey {
    fn from(index: usize) -> Self {
        CodingKey::Index(index)
    }
}

impl fmt::Display for CodingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodingKey::Key(key) => f.write_str(key),
            CodingKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Ordered trail of [`CodingKey`]s from the root to the current position.
///
/// # Example
///
/// ```
/// use dynamo_codec::{CodingKey, CodingPath};
///
/// let mut path = CodingPath::new();
/// path.push(CodingKey::from("items"));
/// path.push(CodingKey::Index(2));
/// path.push(CodingKey::from("name"));
/// assert_eq!(path.to_string(), "items[2].name");
/// assert_eq!(path.len(), 3);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct CodingPath(Vec<CodingKey>);

impl CodingPath {
    pub const fn new() -> Self {
        CodingPath(Vec::new())
    }

    #[inline]
    pub fn push(&mut self, key: CodingKey) {
        self.0.push(key);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<CodingKey> {
        self.0.pop()
    }

    /// Returns a copy of this path extended by `key`.
    pub fn join(&self, key: CodingKey) -> Self {
        let mut path = self.clone();
        path.push(key);
        path
    }

    pub fn as_slice(&self) -> &[CodingKey] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<CodingKey> {
        self.0
    }
}

impl Deref for CodingPath {
    type Target = [CodingKey];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<CodingKey>> for CodingPath {
    fn from(keys: Vec<CodingKey>) -> Self {
        CodingPath(keys)
    }
}

impl FromIterator<CodingKey> for CodingPath {
    fn from_iter<I: IntoIterator<Item = CodingKey>>(iter: I) -> Self {
        CodingPath(iter.into_iter().collect())
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for (position, key) in self.0.iter().enumerate() {
            match key {
                CodingKey::Key(key) if position > 0 => write!(f, ".{key}")?,
                key => write!(f, "{key}")?,
            }
        }
        Ok(())
    }
}
