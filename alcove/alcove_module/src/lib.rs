//! # Alcove Module
//!
//! The images the demonstration host works with:
//!
//! - `module_interface`: the capability interfaces (`LoggerCapability`,
//!   `ModuleCapability`) and the shared `BadException` error type. The host
//!   loads this image exactly once.
//! - `module`: the sample module. Its `Module` type depends on the logger,
//!   on a `BadException` and on the module-private `Dependency`, and reports
//!   all three when invoked.

pub mod interface;
pub mod module;

pub use interface::{
    interface_image, BadException, BAD_EXCEPTION, INTERFACE_IMAGE, LOGGER_CAPABILITY,
    MODULE_CAPABILITY,
};
pub use module::{module_image, Module, DEPENDENCY_TYPE, GREETING, MODULE_IMAGE, MODULE_TYPE};

use alcove_core::ModuleImage;

/// Look up a built-in image by name.
pub fn image(name: &str) -> Option<ModuleImage> {
    match name {
        INTERFACE_IMAGE => Some(interface_image()),
        MODULE_IMAGE => Some(module_image()),
        _ => None,
    }
}

/// Names of every built-in image.
pub fn image_names() -> [&'static str; 2] {
    [INTERFACE_IMAGE, MODULE_IMAGE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_images() {
        for name in image_names() {
            assert_eq!(image(name).unwrap().name(), name);
        }
        assert!(image("unknown").is_none());
    }
}
