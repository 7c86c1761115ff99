//! Boundary registry.
//!
//! Records which type names each boundary defines. Contexts consult it
//! before delegating a load to the host, and the host container uses it to
//! explain a failed resolve when two boundaries define the same name.

use std::collections::{HashMap, HashSet};

use alcove_core::BoundaryId;
use parking_lot::RwLock;
use tracing::debug;

/// Map of boundaries to the type names they define.
#[derive(Debug, Default)]
pub struct BoundaryRegistry {
    boundaries: RwLock<HashMap<BoundaryId, HashSet<String>>>,
}

impl BoundaryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `boundary` defines `names`.
    pub fn register<I, S>(&self, boundary: BoundaryId, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut boundaries = self.boundaries.write();
        let defined = boundaries.entry(boundary).or_default();
        for name in names {
            defined.insert(name.into());
        }
        debug!("Boundary {} now defines {} types", boundary, defined.len());
    }

    /// Forget everything `boundary` defines.
    pub fn unregister(&self, boundary: BoundaryId) -> bool {
        self.boundaries.write().remove(&boundary).is_some()
    }

    /// Whether `boundary` defines `name`.
    pub fn defines(&self, boundary: BoundaryId, name: &str) -> bool {
        self.boundaries
            .read()
            .get(&boundary)
            .map_or(false, |names| names.contains(name))
    }

    /// Every boundary that defines `name`, host first.
    pub fn boundaries_defining(&self, name: &str) -> Vec<BoundaryId> {
        let mut found: Vec<BoundaryId> = self
            .boundaries
            .read()
            .iter()
            .filter(|(_, names)| names.contains(name))
            .map(|(boundary, _)| *boundary)
            .collect();
        found.sort_by_key(|b| !b.is_host());
        found
    }

    /// Whether more than one boundary defines `name`.
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.boundaries_defining(name).len() > 1
    }

    /// Number of registered boundaries.
    pub fn len(&self) -> usize {
        self.boundaries.read().len()
    }

    /// Whether no boundary is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
