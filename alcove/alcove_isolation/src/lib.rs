//! # Alcove Isolation
//!
//! `alcove_isolation` loads module images into unloadable contexts and
//! checks that an unloaded context is really gone.
//!
//! Key concepts:
//!
//! 1. **Host Context**: the never-unloaded boundary holding the interface
//!    image and the host's own types.
//!
//! 2. **Isolated Context**: one module's private universe. Loads resolve
//!    against the module package first and fall back to the host.
//!
//! 3. **Loaded Type / Instance**: a type bound to the context that loaded it,
//!    and an object built from such a type. Both keep their context alive.
//!
//! 4. **Boundary Registry**: which boundary defines which type names.
//!
//! 5. **Reclaimer**: deferred finalization. `unload` only queues a
//!    context's units; a later sweep releases them.
//!
//! 6. **Liveness Probe**: a weak handle plus a bounded sweep-and-check loop.

pub mod context;
pub mod host;
pub mod loaded;
pub mod package;
pub mod probe;
pub mod reclaimer;
pub mod registry;

// Re-export key types and traits for convenience
pub use context::{ContextState, IsolatedContext};
pub use host::HostContext;
pub use loaded::{Instance, LoadContext, LoadedType};
pub use package::ModulePackage;
pub use probe::{LivenessHandle, LivenessProbe, DEFAULT_MAX_RETRIES};
pub use reclaimer::Reclaimer;
pub use registry::BoundaryRegistry;
