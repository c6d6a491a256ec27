//! The tagged tree value at the heart of the plist store.

use crate::error::{Error, Result};

/// A schema-less property-list node: dictionary, array, string, integer, or boolean.
///
/// Dictionaries preserve insertion order so that re-serializing an unmodified
/// tree yields byte-identical output (the stable-serialization requirement of
/// the data model). Lookup is by exact string equality, case-sensitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Ordered map from string keys to nodes.
    Dictionary(Vec<(String, Node)>),
    /// Ordered sequence of nodes.
    Array(Vec<Node>),
    /// UTF-8 string value.
    String(String),
    /// Signed integer value (covers the registry's `uint64` fields too; the
    /// format never stores negative sizes or counts in practice).
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
}

impl Node {
    /// What: Construct an empty dictionary node.
    #[must_use]
    pub const fn dict() -> Self {
        Self::Dictionary(Vec::new())
    }

    /// What: Construct an empty array node.
    #[must_use]
    pub const fn array() -> Self {
        Self::Array(Vec::new())
    }

    /// What: Borrow this node as a dictionary's entries.
    ///
    /// Output:
    /// - `Some(&[(String, Node)])` if `self` is a [`Node::Dictionary`].
    /// - `None` otherwise.
    #[must_use]
    pub fn as_dict(&self) -> Option<&[(String, Node)]> {
        match self {
            Self::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    /// What: Borrow this node as an array's elements.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Self::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// What: Borrow this node as a string slice.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// What: Read this node as an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// What: Read this node as a `u64`, rejecting negative values.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self.as_int() {
            Some(n) if n >= 0 => Some(n as u64),
            _ => None,
        }
    }

    /// What: Read this node as a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// What: Look up a key in this dictionary node.
    ///
    /// Inputs:
    /// - `key`: exact, case-sensitive key to search for.
    ///
    /// Output:
    /// - `Some(&Node)` for the first entry (there should only ever be one)
    ///   whose key equals `key`.
    /// - `None` if `self` is not a dictionary or the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_dict()?.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// What: Mutably look up a key in this dictionary node.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self {
            Self::Dictionary(entries) => entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// What: Insert or overwrite a key in this dictionary node.
    ///
    /// Inputs:
    /// - `key`: key to set.
    /// - `value`: node to store.
    ///
    /// Details:
    /// - If `key` already exists, its value is replaced in place (preserving
    ///   its original position); otherwise the pair is appended, preserving
    ///   insertion order for stable re-serialization.
    /// - Panics (via `Error::MissingField` caller-side, not here) is not
    ///   applicable: calling this on a non-dictionary node turns it into one,
    ///   matching the source's "create if absent" pattern in `repoidx_getdict`.
    pub fn set(&mut self, key: &str, value: Node) {
        if !matches!(self, Self::Dictionary(_)) {
            *self = Self::dict();
        }
        if let Self::Dictionary(entries) = self {
            if let Some(entry) = entries.iter_mut().find(|(k, _)| k == key) {
                entry.1 = value;
            } else {
                entries.push((key.to_string(), value));
            }
        }
    }

    /// What: Remove a key from this dictionary node.
    ///
    /// Output:
    /// - `true` if the key was present and removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self {
            Self::Dictionary(entries) => {
                if let Some(idx) = entries.iter().position(|(k, _)| k == key) {
                    entries.remove(idx);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// What: Fetch a required string field, erroring with the field name on failure.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get(key)
            .and_then(Node::as_str)
            .ok_or_else(|| Error::MissingField(key.to_string()))
    }

    /// What: Fetch a required array field, erroring with the field name on failure.
    pub fn require_array(&self, key: &str) -> Result<&[Node]> {
        self.get(key)
            .and_then(Node::as_array)
            .ok_or_else(|| Error::MissingField(key.to_string()))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        // filename-size and total-pkgs never exceed i64::MAX in practice.
        Self::Integer(n as i64)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<Node>> for Node {
    fn from(elements: Vec<Node>) -> Self {
        Self::Array(elements)
    }
}

impl From<&Node> for ::plist::Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Dictionary(entries) => {
                let mut dict = ::plist::Dictionary::new();
                for (k, v) in entries {
                    dict.insert(k.clone(), Self::from(v));
                }
                Self::Dictionary(dict)
            }
            Node::Array(elements) => Self::Array(elements.iter().map(Self::from).collect()),
            Node::String(s) => Self::String(s.clone()),
            Node::Integer(n) => Self::Integer((*n).into()),
            Node::Boolean(b) => Self::Boolean(*b),
        }
    }
}

impl TryFrom<::plist::Value> for Node {
    type Error = Error;

    fn try_from(value: ::plist::Value) -> Result<Self> {
        match value {
            ::plist::Value::Dictionary(dict) => {
                let mut entries = Vec::with_capacity(dict.len());
                for (k, v) in dict {
                    entries.push((k, Self::try_from(v)?));
                }
                Ok(Self::Dictionary(entries))
            }
            ::plist::Value::Array(elements) => {
                let elements = elements
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Array(elements))
            }
            ::plist::Value::String(s) => Ok(Self::String(s)),
            ::plist::Value::Integer(n) => n
                .as_signed()
                .map(Self::Integer)
                .ok_or_else(|| Error::MissingField("integer out of i64 range".to_string())),
            ::plist::Value::Boolean(b) => Ok(Self::Boolean(b)),
            other => Err(Error::MissingField(format!(
                "unsupported plist value kind: {other:?}"
            ))),
        }
    }
}
