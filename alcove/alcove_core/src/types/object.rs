//! Runtime objects produced by constructors.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::traits::{LoggerCapability, ModuleCapability};

/// The payload of a constructed object, tagged by the capability it offers.
#[derive(Clone)]
pub enum Object {
    /// An implementation of the logging capability.
    Logger(Arc<dyn LoggerCapability>),

    /// An implementation of the module capability.
    Module(Arc<dyn ModuleCapability>),

    /// An error value.
    Fault(Arc<dyn StdError + Send + Sync>),

    /// A plain value known only through its display form.
    Value(Arc<dyn fmt::Display + Send + Sync>),
}

/// The tag of an [`Object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// See [`Object::Logger`].
    Logger,
    /// See [`Object::Module`].
    Module,
    /// See [`Object::Fault`].
    Fault,
    /// See [`Object::Value`].
    Value,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Logger => "logger",
            ObjectKind::Module => "module",
            ObjectKind::Fault => "fault",
            ObjectKind::Value => "value",
        };
        f.write_str(name)
    }
}

impl Object {
    /// The tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Logger(_) => ObjectKind::Logger,
            Object::Module(_) => ObjectKind::Module,
            Object::Fault(_) => ObjectKind::Fault,
            Object::Value(_) => ObjectKind::Value,
        }
    }

    /// The logging capability, if this object offers it.
    pub fn as_logger(&self) -> Option<Arc<dyn LoggerCapability>> {
        match self {
            Object::Logger(logger) => Some(Arc::clone(logger)),
            _ => None,
        }
    }

    /// The module capability, if this object offers it.
    pub fn as_module(&self) -> Option<Arc<dyn ModuleCapability>> {
        match self {
            Object::Module(module) => Some(Arc::clone(module)),
            _ => None,
        }
    }

    /// The error value, if this object is one.
    pub fn as_fault(&self) -> Option<Arc<dyn StdError + Send + Sync>> {
        match self {
            Object::Fault(fault) => Some(Arc::clone(fault)),
            _ => None,
        }
    }

    /// The display form of a plain value or error.
    pub fn display(&self) -> Option<String> {
        match self {
            Object::Value(value) => Some(value.to_string()),
            Object::Fault(fault) => Some(fault.to_string()),
            _ => None,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display() {
            Some(shown) => write!(f, "Object::{}({})", self.kind(), shown),
            None => write!(f, "Object::{}", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl StdError for Boom {}

    #[test]
    fn test_object_accessors() {
        let fault = Object::Fault(Arc::new(Boom));
        assert_eq!(fault.kind(), ObjectKind::Fault);
        assert!(fault.as_logger().is_none());
        assert_eq!(fault.as_fault().map(|e| e.to_string()), Some("boom".into()));

        let value = Object::Value(Arc::new("module::Dependency"));
        assert_eq!(value.display().as_deref(), Some("module::Dependency"));
        assert_eq!(format!("{:?}", value), "Object::value(module::Dependency)");
    }
}
