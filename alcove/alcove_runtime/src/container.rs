//! The host's dependency container.
//!
//! Given a type, the container produces an instance, resolving constructor
//! dependencies recursively. Abstract types are mapped to concrete ones
//! through registrations made at setup.
//!
//! Every type the container is asked to resolve gets a build plan, and
//! build plans are cached for the lifetime of the container. A plan holds
//! the types it mentions, so a long-lived container that has ever resolved
//! a type from an isolated context keeps that context reachable.

use std::collections::HashMap;
use std::sync::Arc;

use alcove_core::error::{Error, IsolationError, ResolutionError, Result};
use alcove_core::{BoundaryId, TypeKey};
use alcove_isolation::{HostContext, Instance, LoadContext, LoadedType};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Recursion limit for a single resolve.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Clone)]
struct BuildPlan {
    target: Arc<LoadedType>,
    dependencies: Vec<Arc<LoadedType>>,
}

/// A dependency container living in the host boundary.
pub struct Container {
    host: Arc<HostContext>,
    registrations: HashMap<TypeKey, Arc<LoadedType>>,
    build_plans: Mutex<HashMap<TypeKey, BuildPlan>>,
    max_depth: usize,
}

impl Container {
    /// Create a container without registrations.
    pub fn new(host: Arc<HostContext>) -> Self {
        Self {
            host,
            registrations: HashMap::new(),
            build_plans: Mutex::new(HashMap::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Change the recursion limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The boundary the container itself lives in.
    pub fn boundary(&self) -> BoundaryId {
        self.host.boundary()
    }

    /// Map the host type `from` to the host type `to`.
    pub fn register_type(&mut self, from: &str, to: &str) -> Result<&mut Self> {
        let from = self.host.load_type(from)?;
        let to = self.host.load_type(to)?;
        if !to.is_assignable_to(from.key())? {
            return Err(ResolutionError::TypeMismatch {
                expected: from.key().to_string(),
                actual: to.key().to_string(),
            }
            .into());
        }
        debug!("Registered {} -> {}", from.key(), to.key());
        self.registrations.insert(from.key().clone(), to);
        Ok(self)
    }

    /// Register a concrete host type as resolvable to itself.
    pub fn register_concrete(&mut self, name: &str) -> Result<&mut Self> {
        self.register_type(name, name)
    }

    /// Whether a registration exists for `key`.
    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.registrations.contains_key(key)
    }

    /// Resolve a host type by name.
    pub fn resolve_named(&self, name: &str) -> Result<Instance> {
        let ty = self.host.load_type(name)?;
        self.resolve(&ty)
    }

    /// Resolve `ty` and everything it depends on.
    pub fn resolve(&self, ty: &Arc<LoadedType>) -> Result<Instance> {
        self.resolve_at(ty, 0)
    }

    /// Number of cached build plans.
    pub fn cached_plans(&self) -> usize {
        self.build_plans.lock().len()
    }

    /// Whether a build plan for `key` is cached.
    pub fn has_plan(&self, key: &TypeKey) -> bool {
        self.build_plans.lock().contains_key(key)
    }

    /// Whether any cached build plan mentions a type from `boundary`.
    pub fn references_boundary(&self, boundary: BoundaryId) -> bool {
        self.build_plans.lock().iter().any(|(key, plan)| {
            key.boundary == boundary
                || plan.target.boundary() == boundary
                || plan.dependencies.iter().any(|d| d.boundary() == boundary)
        })
    }

    fn explain_missing_registration(&self, ty: &LoadedType) -> String {
        let registry = self.host.registry();
        if !registry.is_ambiguous(ty.name()) {
            return "no registration maps this abstract type to a concrete one".to_string();
        }
        let others: Vec<String> = registry
            .boundaries_defining(ty.name())
            .into_iter()
            .filter(|boundary| *boundary != ty.boundary())
            .map(|boundary| boundary.to_string())
            .collect();
        format!(
            "no registration for this copy; '{}' is also defined by {}, so the module ships its own definition",
            ty.name(),
            others.join(", ")
        )
    }

    fn resolve_at(&self, ty: &Arc<LoadedType>, depth: usize) -> Result<Instance> {
        if depth > self.max_depth {
            return Err(ResolutionError::DepthExceeded(ty.key().to_string(), self.max_depth).into());
        }
        trace!("Container resolving {} at depth {}", ty.key(), depth);

        let plan = self.plan_for(ty)?;
        let mut args = Vec::with_capacity(plan.dependencies.len());
        for dependency in &plan.dependencies {
            let arg = self.resolve_at(dependency, depth + 1).map_err(|e| match e {
                Error::Resolution(ResolutionError::DepthExceeded(..)) => e,
                other => Error::construction(
                    ty.key().to_string(),
                    format!("dependency {}: {}", dependency.key(), other),
                ),
            })?;
            args.push(arg);
        }
        plan.target.construct(args)
    }

    fn plan_for(&self, ty: &Arc<LoadedType>) -> Result<BuildPlan> {
        if let Some(plan) = self.build_plans.lock().get(ty.key()) {
            return Ok(plan.clone());
        }

        let target = self
            .registrations
            .get(ty.key())
            .cloned()
            .unwrap_or_else(|| Arc::clone(ty));
        if !target.is_constructible() {
            return Err(Error::construction(
                ty.key().to_string(),
                self.explain_missing_registration(ty),
            ));
        }
        let dependencies = target.dependencies().map_err(|e| match e {
            Error::Isolation(IsolationError::ModuleTypeNotFound { type_name, .. }) => {
                Error::construction(ty.key().to_string(), format!("unknown dependency '{}'", type_name))
            }
            other => other,
        })?;

        let plan = BuildPlan {
            target,
            dependencies,
        };
        debug!("Caching build plan for {}", ty.key());
        self.build_plans
            .lock()
            .insert(ty.key().clone(), plan.clone());
        Ok(plan)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.registrations.len())
            .field("cached_plans", &self.cached_plans())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcove_core::{ModuleImage, Object, TypeDescriptor};
    use alcove_isolation::BoundaryRegistry;

    fn host() -> Arc<HostContext> {
        let image = ModuleImage::new("host")
            .define(TypeDescriptor::interface("Greeter"))
            .define(
                TypeDescriptor::concrete("English", |_| Ok(Object::Value(Arc::new("hello"))))
                    .implementing("Greeter"),
            )
            .define(
                TypeDescriptor::concrete("Party", |args| {
                    let shown = args[0].display().unwrap_or_default();
                    Ok(Object::Value(Arc::new(format!("party: {}", shown))))
                })
                .depends_on(["Greeter"]),
            )
            .define(
                TypeDescriptor::concrete("Loop", |_| Ok(Object::Value(Arc::new("never"))))
                    .depends_on(["Loop"]),
            );
        HostContext::with_images(Arc::new(BoundaryRegistry::new()), [image]).unwrap()
    }

    #[test]
    fn test_registrations_drive_resolution() {
        let mut container = Container::new(host());
        container.register_type("Greeter", "English").unwrap();
        assert!(container.is_registered(&TypeKey::host("Greeter")));

        let party = container.resolve_named("Party").unwrap();
        assert_eq!(party.object().display().as_deref(), Some("party: hello"));
        assert!(container.has_plan(&TypeKey::host("Party")));
        assert!(container.has_plan(&TypeKey::host("Greeter")));
        assert_eq!(container.cached_plans(), 2);
        assert!(!container.references_boundary(BoundaryId::Context(alcove_core::ContextId::new())));
    }

    #[test]
    fn test_unregistered_interface_fails() {
        let container = Container::new(host());
        let err = container.resolve_named("Party").unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::Construction { .. })
        ));
        assert!(err.to_string().contains("Greeter@host"));
        assert!(err.to_string().contains("no registration maps"));
    }

    #[test]
    fn test_registration_requires_assignable_target() {
        let mut container = Container::new(host());
        assert!(matches!(
            container.register_type("Greeter", "Party"),
            Err(Error::Resolution(ResolutionError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_cyclic_dependencies_hit_the_depth_limit() {
        let container = Container::new(host()).with_max_depth(4);
        assert!(matches!(
            container.resolve_named("Loop"),
            Err(Error::Resolution(ResolutionError::DepthExceeded(_, 4)))
        ));
    }
}
