//! The direct container strategy.

use std::sync::Arc;

use alcove_core::error::Result;
use alcove_isolation::{Instance, LoadedType};
use tracing::debug;

use super::{ResolverStrategy, StrategyKind};
use crate::container::Container;

/// Hands the module type straight to the shared container.
///
/// The container caches a build plan for the module type itself, so the
/// module's context stays reachable for as long as the container lives.
pub struct ContainerResolver {
    container: Arc<Container>,
}

impl ContainerResolver {
    /// Create a resolver that delegates to `container`.
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }
}

impl ResolverStrategy for ContainerResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Container
    }

    fn resolve(&self, module_type: &Arc<LoadedType>) -> Result<Instance> {
        debug!("Resolving {} through the shared container", module_type.key());
        self.container.resolve(module_type)
    }
}
