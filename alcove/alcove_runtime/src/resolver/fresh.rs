//! The fresh-container strategy.

use std::sync::Arc;

use alcove_core::error::Result;
use alcove_isolation::{Instance, LoadedType};
use tracing::debug;

use super::{ContainerFactory, ResolverStrategy, StrategyKind};

/// Resolves through a container that lives only for one call.
///
/// Whatever the container caches about the module is dropped together with
/// it, so nothing outlives the attempt.
pub struct FreshContainerResolver {
    factory: ContainerFactory,
}

impl FreshContainerResolver {
    /// Create a resolver that builds each container with `factory`.
    pub fn new(factory: ContainerFactory) -> Self {
        Self { factory }
    }
}

impl ResolverStrategy for FreshContainerResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FreshContainer
    }

    fn resolve(&self, module_type: &Arc<LoadedType>) -> Result<Instance> {
        let container = (self.factory)()?;
        debug!("Resolving {} through a fresh container", module_type.key());
        container.resolve(module_type)
    }
}
