//! The host context.
//!
//! The host is the default boundary. It holds the images the host process
//! itself was built with (the capability interfaces and the host's own
//! implementations) and it is never unloaded.

use std::sync::{Arc, Weak};

use alcove_core::error::{Error, IsolationError, Result};
use alcove_core::{BoundaryId, ModuleImage};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::loaded::{LoadContext, LoadedType};
use crate::registry::BoundaryRegistry;

/// Name of the host context.
pub const HOST_CONTEXT_NAME: &str = "host";

/// The host's load context.
pub struct HostContext {
    me: Weak<HostContext>,
    images: RwLock<Vec<Arc<ModuleImage>>>,
    registry: Arc<BoundaryRegistry>,
}

impl HostContext {
    /// Create an empty host context reporting to `registry`.
    pub fn new(registry: Arc<BoundaryRegistry>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            images: RwLock::new(Vec::new()),
            registry,
        })
    }

    /// Create a host context with `images` already loaded.
    pub fn with_images<I>(registry: Arc<BoundaryRegistry>, images: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = ModuleImage>,
    {
        let host = Self::new(registry);
        for image in images {
            host.load_image(image)?;
        }
        Ok(host)
    }

    /// Load an image into the host.
    pub fn load_image(&self, image: ModuleImage) -> Result<()> {
        let mut images = self.images.write();
        if images.iter().any(|loaded| loaded.name() == image.name()) {
            return Err(IsolationError::DuplicateImage(image.name().to_string()).into());
        }

        self.registry.register(
            BoundaryId::Host,
            image.types().iter().map(|t| t.name().to_string()),
        );
        info!("Loaded image '{}' into the host", image.name());
        images.push(Arc::new(image));
        Ok(())
    }

    /// Whether an image with this name is loaded.
    pub fn has_image(&self, name: &str) -> bool {
        self.images.read().iter().any(|image| image.name() == name)
    }

    /// The shared boundary registry.
    pub fn registry(&self) -> &Arc<BoundaryRegistry> {
        &self.registry
    }
}

impl LoadContext for HostContext {
    fn name(&self) -> &str {
        HOST_CONTEXT_NAME
    }

    fn boundary(&self) -> BoundaryId {
        BoundaryId::Host
    }

    fn load_type(&self, type_name: &str) -> Result<Arc<LoadedType>> {
        let (image, descriptor) = {
            let images = self.images.read();
            let image = images
                .iter()
                .find(|image| image.defines(type_name))
                .ok_or_else(|| IsolationError::ModuleTypeNotFound {
                    type_name: type_name.to_string(),
                    context: HOST_CONTEXT_NAME.to_string(),
                })?;
            let descriptor = image.find(type_name).cloned().ok_or_else(|| {
                Error::Runtime(format!("image '{}' lost type '{}'", image.name(), type_name))
            })?;
            (image.name().to_string(), descriptor)
        };

        let owner: Arc<dyn LoadContext> = self
            .me
            .upgrade()
            .ok_or_else(|| Error::Runtime("host context is being dropped".into()))?;
        debug!("Host resolved type '{}' from image '{}'", type_name, image);
        Ok(LoadedType::new(owner, &image, descriptor))
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let images: Vec<String> = self
            .images
            .read()
            .iter()
            .map(|image| image.name().to_string())
            .collect();
        f.debug_struct("HostContext").field("images", &images).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcove_core::{Object, TypeDescriptor};

    fn interface_image() -> ModuleImage {
        ModuleImage::new("interface")
            .define(TypeDescriptor::interface("LoggerCapability"))
            .define(TypeDescriptor::concrete("Marker", |_| {
                Ok(Object::Value(Arc::new("marker")))
            }))
    }

    #[test]
    fn test_host_loads_and_registers_types() {
        let registry = Arc::new(BoundaryRegistry::new());
        let host = HostContext::with_images(Arc::clone(&registry), [interface_image()]).unwrap();

        assert!(host.has_image("interface"));
        assert!(registry.defines(BoundaryId::Host, "LoggerCapability"));

        let marker = host.load_type("Marker").unwrap();
        assert_eq!(marker.boundary(), BoundaryId::Host);
        assert_eq!(marker.image(), "interface");
        assert_eq!(marker.owner_name(), HOST_CONTEXT_NAME);
    }

    #[test]
    fn test_host_rejects_duplicate_images_and_unknown_types() {
        let host = HostContext::new(Arc::new(BoundaryRegistry::new()));
        host.load_image(interface_image()).unwrap();

        assert!(matches!(
            host.load_image(interface_image()),
            Err(Error::Isolation(IsolationError::DuplicateImage(_)))
        ));
        assert!(matches!(
            host.load_type("Module"),
            Err(Error::Isolation(IsolationError::ModuleTypeNotFound { .. }))
        ));
    }
}
