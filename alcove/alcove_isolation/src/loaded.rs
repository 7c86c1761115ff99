//! Loaded types and instances.
//!
//! A [`LoadedType`] is a [`TypeDescriptor`] bound to the context that loaded
//! it, and it holds that context strongly. An [`Instance`] holds the type it
//! was built from. Any reference to either therefore keeps the whole context
//! reachable.

use std::fmt;
use std::sync::Arc;

use alcove_core::error::{Error, ResolutionError, Result};
use alcove_core::{BoundaryId, ModuleCapability, Object, TypeDescriptor, TypeKey, TypeKind};
use tracing::trace;

/// A boundary that can load types by name.
pub trait LoadContext: Send + Sync {
    /// Human readable name of the context.
    fn name(&self) -> &str;

    /// The boundary this context represents.
    fn boundary(&self) -> BoundaryId;

    /// Load a type by name, binding it to the boundary that defines it.
    fn load_type(&self, type_name: &str) -> Result<Arc<LoadedType>>;
}

/// A type bound to the context that loaded it.
pub struct LoadedType {
    key: TypeKey,
    image: String,
    descriptor: TypeDescriptor,
    owner: Arc<dyn LoadContext>,
}

impl LoadedType {
    /// Bind `descriptor` from `image` to `owner`.
    pub fn new(owner: Arc<dyn LoadContext>, image: &str, descriptor: TypeDescriptor) -> Arc<Self> {
        let key = TypeKey::new(owner.boundary(), descriptor.name());
        trace!("Bound type {} from image {}", key, image);
        Arc::new(Self {
            key,
            image: image.to_string(),
            descriptor,
            owner,
        })
    }

    /// The type identity.
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// The boundary that loaded the type.
    pub fn boundary(&self) -> BoundaryId {
        self.key.boundary
    }

    /// The image that defines the type.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The static descriptor.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Name of the owning context.
    pub fn owner_name(&self) -> &str {
        self.owner.name()
    }

    /// Whether the type has a constructor.
    pub fn is_constructible(&self) -> bool {
        self.descriptor.kind() == TypeKind::Concrete && self.descriptor.constructor().is_some()
    }

    /// Resolve the declared constructor dependencies through the owning
    /// context, in order.
    pub fn dependencies(&self) -> Result<Vec<Arc<LoadedType>>> {
        self.descriptor
            .dependencies()
            .iter()
            .map(|name| self.owner.load_type(name))
            .collect()
    }

    /// Whether values of this type can be used where `target` is expected.
    pub fn is_assignable_to(&self, target: &TypeKey) -> Result<bool> {
        if &self.key == target {
            return Ok(true);
        }
        for capability in self.descriptor.implements() {
            if self.owner.load_type(capability)?.key() == target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Build an instance from already resolved dependencies.
    ///
    /// `args` must line up with [`LoadedType::dependencies`].
    pub fn construct(self: &Arc<Self>, args: Vec<Instance>) -> Result<Instance> {
        let constructor = match self.descriptor.constructor() {
            Some(constructor) if self.descriptor.kind() == TypeKind::Concrete => constructor,
            _ => return Err(ResolutionError::NotConstructible(self.key.to_string()).into()),
        };

        let expected = self.dependencies()?;
        if expected.len() != args.len() {
            return Err(Error::construction(
                self.key.to_string(),
                format!("expected {} arguments, got {}", expected.len(), args.len()),
            ));
        }
        for (dependency, arg) in expected.iter().zip(&args) {
            if !arg.ty().is_assignable_to(dependency.key())? {
                return Err(ResolutionError::TypeMismatch {
                    expected: dependency.key().to_string(),
                    actual: arg.ty().key().to_string(),
                }
                .into());
            }
        }

        let objects: Vec<Object> = args.iter().map(|arg| arg.object().clone()).collect();
        let object = constructor(&objects)
            .map_err(|e| Error::construction(self.key.to_string(), e.to_string()))?;
        Ok(Instance::new(Arc::clone(self), object))
    }
}

impl fmt::Debug for LoadedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedType")
            .field("key", &self.key)
            .field("image", &self.image)
            .field("owner", &self.owner.name())
            .finish()
    }
}

/// An object together with the type it was built from.
#[derive(Clone)]
pub struct Instance {
    ty: Arc<LoadedType>,
    object: Object,
}

impl Instance {
    /// Pair an object with its type.
    pub fn new(ty: Arc<LoadedType>, object: Object) -> Self {
        Self { ty, object }
    }

    /// The type of this instance.
    pub fn ty(&self) -> &Arc<LoadedType> {
        &self.ty
    }

    /// The object payload.
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// View this instance as the module capability identified by `capability`.
    ///
    /// Fails with a type mismatch when the instance's type implements a
    /// different definition of the capability, such as one loaded into the
    /// module's own context.
    pub fn as_module(&self, capability: &TypeKey) -> Result<Arc<dyn ModuleCapability>> {
        if !self.ty.is_assignable_to(capability)? {
            return Err(ResolutionError::TypeMismatch {
                expected: capability.to_string(),
                actual: self.ty.key().to_string(),
            }
            .into());
        }
        self.object.as_module().ok_or_else(|| {
            ResolutionError::TypeMismatch {
                expected: capability.to_string(),
                actual: format!("{} ({} object)", self.ty.key(), self.object.kind()),
            }
            .into()
        })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", self.ty.key())
            .field("object", &self.object)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcove_core::error::IsolationError;
    use std::collections::HashMap;

    struct FixedContext {
        types: HashMap<String, TypeDescriptor>,
        me: std::sync::Weak<FixedContext>,
    }

    impl FixedContext {
        fn new(types: Vec<TypeDescriptor>) -> Arc<Self> {
            Arc::new_cyclic(|me| Self {
                types: types
                    .into_iter()
                    .map(|t| (t.name().to_string(), t))
                    .collect(),
                me: me.clone(),
            })
        }
    }

    impl LoadContext for FixedContext {
        fn name(&self) -> &str {
            "fixed"
        }

        fn boundary(&self) -> BoundaryId {
            BoundaryId::Host
        }

        fn load_type(&self, type_name: &str) -> Result<Arc<LoadedType>> {
            let descriptor = self.types.get(type_name).cloned().ok_or_else(|| {
                IsolationError::ModuleTypeNotFound {
                    type_name: type_name.into(),
                    context: "fixed".into(),
                }
            })?;
            let me: Arc<dyn LoadContext> = self.me.upgrade().expect("context alive");
            Ok(LoadedType::new(me, "fixed-image", descriptor))
        }
    }

    fn sample() -> Arc<FixedContext> {
        FixedContext::new(vec![
            TypeDescriptor::interface("Named"),
            TypeDescriptor::concrete("Leaf", |_| Ok(Object::Value(Arc::new("leaf"))))
                .implementing("Named"),
            TypeDescriptor::concrete("Root", |args| {
                let shown = args[0].display().unwrap_or_default();
                Ok(Object::Value(Arc::new(format!("root({})", shown))))
            })
            .depends_on(["Named"]),
        ])
    }

    #[test]
    fn test_construct_with_assignable_argument() {
        let ctx = sample();
        let leaf_type = ctx.load_type("Leaf").unwrap();
        let root_type = ctx.load_type("Root").unwrap();

        let leaf = leaf_type.construct(Vec::new()).unwrap();
        assert!(leaf_type.is_assignable_to(&TypeKey::host("Named")).unwrap());

        let root = root_type.construct(vec![leaf]).unwrap();
        assert_eq!(root.object().display().as_deref(), Some("root(leaf)"));
        assert_eq!(root.ty().name(), "Root");
    }

    #[test]
    fn test_construct_rejects_wrong_arity_and_type() {
        let ctx = sample();
        let root_type = ctx.load_type("Root").unwrap();
        let err = root_type.construct(Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::Construction { .. })
        ));

        let other = root_type
            .construct(vec![ctx.load_type("Leaf").unwrap().construct(Vec::new()).unwrap()])
            .unwrap();
        let err = root_type.construct(vec![other]).unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_interface_is_not_constructible() {
        let ctx = sample();
        let named = ctx.load_type("Named").unwrap();
        assert!(!named.is_constructible());
        assert!(matches!(
            named.construct(Vec::new()),
            Err(Error::Resolution(ResolutionError::NotConstructible(_)))
        ));
    }

    #[test]
    fn test_value_is_not_a_module() {
        let ctx = sample();
        let leaf = ctx.load_type("Leaf").unwrap().construct(Vec::new()).unwrap();
        assert!(leaf.as_module(&TypeKey::host("Named")).is_err());
        assert!(leaf.as_module(&TypeKey::host("ModuleCapability")).is_err());
    }
}
