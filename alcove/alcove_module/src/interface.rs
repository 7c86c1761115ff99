//! The capability interface image.

use std::sync::Arc;

use alcove_core::{ModuleImage, Object, TypeDescriptor};
use thiserror::Error;

/// Name of the interface image.
pub const INTERFACE_IMAGE: &str = "module_interface";

/// Type name of the logging capability.
pub const LOGGER_CAPABILITY: &str = "LoggerCapability";

/// Type name of the module capability.
pub const MODULE_CAPABILITY: &str = "ModuleCapability";

/// Type name of the shared error type.
pub const BAD_EXCEPTION: &str = "BadException";

/// The error a host hands to modules to show that errors cross the boundary.
#[derive(Debug, Default, Clone, Copy, Error)]
#[error("module_interface::BadException: something bad was injected")]
pub struct BadException;

/// Build the interface image.
pub fn interface_image() -> ModuleImage {
    ModuleImage::new(INTERFACE_IMAGE)
        .define(TypeDescriptor::interface(LOGGER_CAPABILITY))
        .define(TypeDescriptor::interface(MODULE_CAPABILITY))
        .define(TypeDescriptor::concrete(BAD_EXCEPTION, |_| {
            Ok(Object::Fault(Arc::new(BadException)))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcove_core::{ObjectKind, TypeKind};

    #[test]
    fn test_interface_image_contents() {
        let image = interface_image();
        assert_eq!(image.find(LOGGER_CAPABILITY).unwrap().kind(), TypeKind::Interface);
        assert_eq!(image.find(MODULE_CAPABILITY).unwrap().kind(), TypeKind::Interface);

        let bad = image.find(BAD_EXCEPTION).unwrap();
        let built = (bad.constructor().unwrap())(&[]).unwrap();
        assert_eq!(built.kind(), ObjectKind::Fault);
        assert_eq!(built.display().unwrap(), BadException.to_string());
    }
}
