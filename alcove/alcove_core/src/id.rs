//! Strongly-typed identifiers.
//!
//! Each identifier type is a thin wrapper around a UUID with a phantom type
//! parameter, so identifiers for different entities cannot be mixed up.
//!
//! # Examples
//!
//! ```
//! use alcove_core::id::ContextId;
//!
//! let a = ContextId::new();
//! let b = ContextId::new();
//! assert_ne!(a, b);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

/// A type-safe identifier based on UUID.
#[derive(Serialize, Deserialize)]
pub struct Id<T> {
    uuid: Uuid,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Create an identifier from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _marker: PhantomData,
        }
    }

    /// Get the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// A short form of the identifier, suitable for context tags.
    pub fn short(&self) -> String {
        self.uuid.simple().to_string()[..8].to_string()
    }
}

// Manual impls so that `T` itself needs no bounds.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.uuid)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

/// Marker for isolated context identifiers.
#[derive(Debug)]
pub enum ContextMarker {}

/// Identifier of an isolated context.
pub type ContextId = Id<ContextMarker>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_distinct_and_hashable() {
        let a = ContextId::new();
        let b = ContextId::new();
        assert_ne!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_short_form() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = ContextId::from_uuid(uuid);
        assert_eq!(id.short(), "550e8400");
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }
}
