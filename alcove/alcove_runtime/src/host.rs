//! The host side of the playground.
//!
//! The host process is built with the interface image and its own `host`
//! image, which provides the `Logger` every module gets injected.

use std::error::Error as StdError;
use std::sync::Arc;

use alcove_core::error::Result;
use alcove_core::{LogSink, LoggerCapability, ModuleImage, Object, TypeDescriptor};
use alcove_isolation::{BoundaryRegistry, HostContext};
use alcove_module::{interface_image, BAD_EXCEPTION, LOGGER_CAPABILITY};

use crate::container::Container;

/// Name of the host's own image.
pub const HOST_IMAGE: &str = "host";

/// Type name of the host logger.
pub const LOGGER_TYPE: &str = "Logger";

/// Prefix of every line the host logger writes.
pub const LOG_PREFIX: &str = "[Playground]";

/// The logger the host hands to modules.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Create a logger writing to `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl LoggerCapability for Logger {
    fn log(&self, message: &str) {
        self.sink.write_line(&format!("{} {}", LOG_PREFIX, message));
    }

    fn log_error(&self, error: &(dyn StdError + Send + Sync)) {
        self.sink
            .write_line(&format!("{} Received {}", LOG_PREFIX, error));
    }
}

/// Build the host image around `sink`.
pub fn host_image(sink: Arc<dyn LogSink>) -> ModuleImage {
    let logger = Logger::new(sink);
    ModuleImage::new(HOST_IMAGE).define(
        TypeDescriptor::concrete(LOGGER_TYPE, move |_| Ok(Object::Logger(Arc::new(logger.clone()))))
            .implementing(LOGGER_CAPABILITY),
    )
}

/// Build the host context: the interface image plus the host image.
pub fn build_host(registry: Arc<BoundaryRegistry>, sink: Arc<dyn LogSink>) -> Result<Arc<HostContext>> {
    HostContext::with_images(registry, [interface_image(), host_image(sink)])
}

/// Build a container with the host's registrations.
pub fn prepared_container(host: &Arc<HostContext>) -> Result<Container> {
    let mut container = Container::new(Arc::clone(host));
    container
        .register_type(LOGGER_CAPABILITY, LOGGER_TYPE)?
        .register_concrete(BAD_EXCEPTION)?;
    Ok(container)
}
