//! Capability interfaces shared by the host and every module.
//!
//! These traits are the only definitions of the capability contracts in the
//! process. Module images refer to them by name; the host binds those names
//! to the `module_interface` image it loads once.

pub mod capability;

pub use capability::{LogSink, LoggerCapability, MemorySink, ModuleCapability, StdoutSink};
