//! # Alcove Core
//!
//! `alcove_core` provides the building blocks shared by every side of an
//! isolation boundary: the capability interfaces, the static type manifests
//! that describe loadable module images, identifiers, and the error hierarchy.
//!
//! ## Core Principles
//!
//! 1. **Single interface definition**: `LoggerCapability` and
//!    `ModuleCapability` are defined once, here. Both the host and every
//!    module bind to this one definition, so a module object can be handed
//!    to the host without a type mismatch.
//!
//! 2. **Declared, not introspected**: every constructible type publishes its
//!    constructor dependencies as an ordered list of type names
//!    (`TypeDescriptor`). Resolvers walk that list instead of reflecting on
//!    constructors at runtime.
//!
//! 3. **Explicit type identity**: a type is identified by the boundary that
//!    loaded it plus its name (`TypeKey`). Two boundaries loading the same
//!    image produce two distinct types.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Alcove components
//! - **id**: Strongly-typed identifier types
//! - **traits**: Capability interfaces
//! - **types**: Images, type descriptors, boundaries and runtime objects
//! - **utils**: Logging helpers

pub mod error;
pub mod id;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export key types and traits for convenience
pub use error::{Error, FailureKind, Result};
pub use id::ContextId;
pub use traits::{LogSink, LoggerCapability, MemorySink, ModuleCapability, StdoutSink};
pub use types::{
    BoundaryId, Constructor, ModuleImage, Object, ObjectKind, TypeDescriptor, TypeKey, TypeKind,
};
pub use utils::LogLevel;
