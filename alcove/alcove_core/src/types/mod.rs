//! Data structures used throughout Alcove.

pub mod boundary;
pub mod image;
pub mod object;

pub use boundary::{BoundaryId, TypeKey};
pub use image::{Constructor, ModuleImage, TypeDescriptor, TypeKind};
pub use object::{Object, ObjectKind};
