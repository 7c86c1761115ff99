//! Module images and their static type manifests.
//!
//! A [`ModuleImage`] plays the part of a binary artifact: it carries a name
//! and the [`TypeDescriptor`]s it defines. A descriptor declares everything a
//! resolver needs to build an instance: the capabilities the type
//! implements, its constructor dependencies in order, and the constructor
//! itself.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::types::Object;

/// A constructor receives its dependencies in declaration order.
pub type Constructor = Arc<dyn Fn(&[Object]) -> Result<Object> + Send + Sync>;

/// Whether a type can be instantiated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// An abstract contract; needs a registration to be resolved.
    Interface,

    /// A concrete type with a constructor.
    Concrete,
}

/// Static description of one type defined by an image.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    implements: Vec<String>,
    dependencies: Vec<String>,
    constructor: Option<Constructor>,
}

impl TypeDescriptor {
    /// Describe an interface type.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            implements: Vec::new(),
            dependencies: Vec::new(),
            constructor: None,
        }
    }

    /// Describe a concrete type built by `constructor`.
    pub fn concrete<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&[Object]) -> Result<Object> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            implements: Vec::new(),
            dependencies: Vec::new(),
            constructor: Some(Arc::new(constructor)),
        }
    }

    /// Declare an implemented capability.
    pub fn implementing(mut self, capability: impl Into<String>) -> Self {
        self.implements.push(capability.into());
        self
    }

    /// Declare the constructor dependencies, in order.
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type kind.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Names of the implemented capabilities.
    pub fn implements(&self) -> &[String] {
        &self.implements
    }

    /// Names of the constructor dependencies, in order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// The constructor, if the type is concrete.
    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("implements", &self.implements)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// A loadable unit of types.
#[derive(Debug, Clone)]
pub struct ModuleImage {
    name: String,
    types: Vec<TypeDescriptor>,
}

impl ModuleImage {
    /// Create an empty image.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Add a type to the image.
    pub fn define(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.push(descriptor);
        self
    }

    /// The image name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every type this image defines.
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Find a type by name.
    pub fn find(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.name() == type_name)
    }

    /// Whether this image defines `type_name`.
    pub fn defines(&self, type_name: &str) -> bool {
        self.find(type_name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_manifest() {
        let image = ModuleImage::new("sample")
            .define(TypeDescriptor::interface("Greeter"))
            .define(
                TypeDescriptor::concrete("Hello", |_| Ok(Object::Value(Arc::new("hello"))))
                    .implementing("Greeter")
                    .depends_on(["Logger", "Clock"]),
            );

        assert_eq!(image.name(), "sample");
        assert!(image.defines("Greeter"));
        assert!(!image.defines("Logger"));

        let hello = image.find("Hello").unwrap();
        assert_eq!(hello.kind(), TypeKind::Concrete);
        assert_eq!(hello.implements(), ["Greeter".to_string()]);
        assert_eq!(hello.dependencies(), ["Logger".to_string(), "Clock".to_string()]);

        let built = (hello.constructor().unwrap())(&[]).unwrap();
        assert_eq!(built.display().as_deref(), Some("hello"));

        assert!(image.find("Greeter").unwrap().constructor().is_none());
    }
}
