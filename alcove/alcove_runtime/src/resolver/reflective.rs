//! The reflective strategy.
//!
//! Walks the declared dependencies itself and asks the shared container for
//! each one.

use std::sync::Arc;

use alcove_core::error::Result;
use alcove_isolation::{Instance, LoadedType};
use tracing::debug;

use super::{ResolverStrategy, StrategyKind};
use crate::container::Container;

/// Walks the module type's declared dependencies and satisfies every one of
/// them from the shared container, whatever boundary it comes from.
///
/// Module-private dependencies end up in the shared container's plan cache,
/// which keeps the module's context reachable after unload.
pub struct ReflectiveResolver {
    container: Arc<Container>,
}

impl ReflectiveResolver {
    /// Create a resolver drawing every dependency from `container`.
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }
}

impl ResolverStrategy for ReflectiveResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Reflective
    }

    fn resolve(&self, module_type: &Arc<LoadedType>) -> Result<Instance> {
        let mut args = Vec::new();
        for dependency in module_type.dependencies()? {
            debug!(
                "Resolving dependency {} of {} from the shared container",
                dependency.key(),
                module_type.key()
            );
            args.push(self.container.resolve(&dependency)?);
        }
        module_type.construct(args)
    }
}
