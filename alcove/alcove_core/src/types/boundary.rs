//! Isolation boundaries and type identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::ContextId;

/// The boundary a type was loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryId {
    /// The host process. Never unloaded.
    Host,

    /// An isolated, unloadable context.
    Context(ContextId),
}

impl BoundaryId {
    /// Whether this is the host boundary.
    pub fn is_host(&self) -> bool {
        matches!(self, BoundaryId::Host)
    }
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryId::Host => write!(f, "host"),
            BoundaryId::Context(id) => write!(f, "context:{}", id.short()),
        }
    }
}

/// The identity of a loaded type: the boundary that loaded it plus its name.
///
/// The same type name loaded by two boundaries yields two unequal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    /// The loading boundary.
    pub boundary: BoundaryId,

    /// The type name.
    pub name: String,
}

impl TypeKey {
    /// Create a type key.
    pub fn new(boundary: BoundaryId, name: impl Into<String>) -> Self {
        Self {
            boundary,
            name: name.into(),
        }
    }

    /// Key of a host-defined type.
    pub fn host(name: impl Into<String>) -> Self {
        Self::new(BoundaryId::Host, name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_different_boundary_is_different_type() {
        let ctx = BoundaryId::Context(ContextId::new());
        let host_key = TypeKey::host("LoggerCapability");
        let ctx_key = TypeKey::new(ctx, "LoggerCapability");

        assert_ne!(host_key, ctx_key);
        assert_eq!(host_key, TypeKey::host("LoggerCapability"));
        assert_eq!(host_key.to_string(), "LoggerCapability@host");
        assert!(ctx_key.to_string().starts_with("LoggerCapability@context:"));
    }
}
