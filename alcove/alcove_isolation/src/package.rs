//! Module packages.
//!
//! A package is the module's binary directory: the entry image plus every
//! image shipped next to it. It is the private dependency manifest an
//! isolated context resolves against before falling back to the host.

use std::sync::Arc;

use alcove_core::error::{IsolationError, Result};
use alcove_core::ModuleImage;

/// The images a module ships.
#[derive(Debug, Clone)]
pub struct ModulePackage {
    entry: String,
    images: Vec<Arc<ModuleImage>>,
}

impl ModulePackage {
    /// Create a package whose entry image is `entry`.
    ///
    /// Fails when `entry` is not among `images` or when two images share a
    /// name.
    pub fn new<I>(entry: impl Into<String>, images: I) -> Result<Self>
    where
        I: IntoIterator<Item = ModuleImage>,
    {
        let entry = entry.into();
        let mut collected: Vec<Arc<ModuleImage>> = Vec::new();
        for image in images {
            if collected.iter().any(|c| c.name() == image.name()) {
                return Err(IsolationError::DuplicateImage(image.name().to_string()).into());
            }
            collected.push(Arc::new(image));
        }

        if !collected.iter().any(|image| image.name() == entry) {
            return Err(IsolationError::ImageNotFound(entry).into());
        }

        Ok(Self {
            entry,
            images: collected,
        })
    }

    /// Name of the entry image.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Find a shipped image by name.
    pub fn image(&self, name: &str) -> Option<&Arc<ModuleImage>> {
        self.images.iter().find(|image| image.name() == name)
    }

    /// The first shipped image that defines `type_name`.
    pub fn find_defining(&self, type_name: &str) -> Option<&Arc<ModuleImage>> {
        self.images.iter().find(|image| image.defines(type_name))
    }

    /// Names of all shipped images.
    pub fn image_names(&self) -> Vec<&str> {
        self.images.iter().map(|image| image.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alcove_core::error::Error;
    use alcove_core::TypeDescriptor;

    #[test]
    fn test_package_lookup() {
        let package = ModulePackage::new(
            "module",
            [
                ModuleImage::new("module").define(TypeDescriptor::interface("Module")),
                ModuleImage::new("support").define(TypeDescriptor::interface("Helper")),
            ],
        )
        .unwrap();

        assert_eq!(package.entry(), "module");
        assert_eq!(package.image_names(), vec!["module", "support"]);
        assert_eq!(package.find_defining("Helper").unwrap().name(), "support");
        assert!(package.find_defining("Logger").is_none());
    }

    #[test]
    fn test_package_validation() {
        assert!(matches!(
            ModulePackage::new("missing", [ModuleImage::new("module")]),
            Err(Error::Isolation(IsolationError::ImageNotFound(_)))
        ));
        assert!(matches!(
            ModulePackage::new("module", [ModuleImage::new("module"), ModuleImage::new("module")]),
            Err(Error::Isolation(IsolationError::DuplicateImage(_)))
        ));
    }
}
