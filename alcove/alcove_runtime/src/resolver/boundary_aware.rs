//! The boundary-aware strategy.
//!
//! Types are compared by boundary before anything is handed to the shared
//! container.

use std::sync::Arc;

use alcove_core::error::{ResolutionError, Result};
use alcove_isolation::{Instance, LoadedType};
use tracing::debug;

use super::{ResolverStrategy, StrategyKind};
use crate::container::{Container, DEFAULT_MAX_DEPTH};

/// Uses the shared container only for types from the container's own
/// boundary and constructs everything else in place.
///
/// Only host types ever reach the shared container's cache, so the module's
/// context is free to go once it is unloaded.
pub struct BoundaryAwareResolver {
    container: Arc<Container>,
    max_depth: usize,
}

impl BoundaryAwareResolver {
    /// Create a resolver using `container` for host types only.
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    fn create(&self, ty: &Arc<LoadedType>, depth: usize) -> Result<Instance> {
        if depth > self.max_depth {
            return Err(ResolutionError::DepthExceeded(ty.key().to_string(), self.max_depth).into());
        }

        if ty.boundary() == self.container.boundary() {
            debug!("{} belongs to the container's boundary", ty.key());
            return self.container.resolve(ty);
        }

        debug!("Constructing {} inside its own context", ty.key());
        let args = ty
            .dependencies()?
            .iter()
            .map(|dependency| self.create(dependency, depth + 1))
            .collect::<Result<Vec<_>>>()?;
        ty.construct(args)
    }
}

impl ResolverStrategy for BoundaryAwareResolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BoundaryAware
    }

    fn resolve(&self, module_type: &Arc<LoadedType>) -> Result<Instance> {
        self.create(module_type, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::prepared_container;
    use crate::resolver::fixtures::Fixture;
    use alcove_core::TypeKey;
    use alcove_isolation::{LivenessHandle, LivenessProbe, LoadContext};
    use alcove_module::{BAD_EXCEPTION, LOGGER_CAPABILITY, MODULE_CAPABILITY};

    #[test]
    fn test_only_host_types_reach_the_container() {
        let fixture = Fixture::new();
        let container = Arc::new(prepared_container(&fixture.host).unwrap());
        let resolver = BoundaryAwareResolver::new(Arc::clone(&container));

        let ctx = fixture.context(false);
        let handle = LivenessHandle::observe(&ctx);
        let boundary = ctx.boundary();
        {
            let instance = resolver.resolve(&Fixture::module_type(&ctx)).unwrap();
            let module = instance.as_module(&TypeKey::host(MODULE_CAPABILITY)).unwrap();
            module.report();
        }
        ctx.unload();
        drop(ctx);

        assert!(container.has_plan(&TypeKey::host(LOGGER_CAPABILITY)));
        assert!(container.has_plan(&TypeKey::host(BAD_EXCEPTION)));
        assert!(!container.references_boundary(boundary));
        assert_eq!(fixture.sink.lines().len(), 3);
        assert!(LivenessProbe::new(Arc::clone(&fixture.reclaimer), 10).probe(&handle));
    }

    #[test]
    fn test_shipped_interface_is_not_constructible() {
        let fixture = Fixture::new();
        let resolver = BoundaryAwareResolver::new(Arc::new(prepared_container(&fixture.host).unwrap()));

        let ctx = fixture.context(true);
        let err = resolver.resolve(&Fixture::module_type(&ctx)).unwrap_err();
        assert_eq!(err.kind(), alcove_core::FailureKind::ConstructionError);
        ctx.unload();
    }
}
