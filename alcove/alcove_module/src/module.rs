//! The sample module image.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use alcove_core::error::{Error, Result};
use alcove_core::{LoggerCapability, ModuleCapability, ModuleImage, Object, TypeDescriptor};

use crate::interface::{BAD_EXCEPTION, LOGGER_CAPABILITY, MODULE_CAPABILITY};

/// Name of the module image.
pub const MODULE_IMAGE: &str = "module";

/// Type name of the module entry type.
pub const MODULE_TYPE: &str = "Module";

/// Type name of the module-private dependency.
pub const DEPENDENCY_TYPE: &str = "Dependency";

/// First line the module reports.
pub const GREETING: &str = "Hello Host, nice to meet you! :)";

/// A dependency only the module knows about.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dependency;

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("module::Dependency")
    }
}

/// The module: reports what it was given.
pub struct Module {
    logger: Arc<dyn LoggerCapability>,
    fault: Arc<dyn StdError + Send + Sync>,
    dependency: Arc<dyn fmt::Display + Send + Sync>,
}

impl Module {
    fn from_args(args: &[Object]) -> Result<Self> {
        let [logger, fault, dependency] = args else {
            return Err(Error::construction(
                MODULE_TYPE,
                format!("expected 3 arguments, got {}", args.len()),
            ));
        };

        let logger = logger
            .as_logger()
            .ok_or_else(|| Error::construction(MODULE_TYPE, "argument 1 is not a logger"))?;
        let fault = fault
            .as_fault()
            .ok_or_else(|| Error::construction(MODULE_TYPE, "argument 2 is not an error"))?;
        let dependency = match dependency {
            Object::Value(value) => Arc::clone(value),
            other => {
                return Err(Error::construction(
                    MODULE_TYPE,
                    format!("argument 3 is a {} object, not a value", other.kind()),
                ))
            }
        };

        Ok(Self {
            logger,
            fault,
            dependency,
        })
    }
}

impl ModuleCapability for Module {
    fn report(&self) {
        self.logger.log(GREETING);
        self.logger.log_error(self.fault.as_ref());
        self.logger.log(&self.dependency.to_string());
    }
}

/// Build the module image.
pub fn module_image() -> ModuleImage {
    ModuleImage::new(MODULE_IMAGE)
        .define(
            TypeDescriptor::concrete(MODULE_TYPE, |args| {
                Ok(Object::Module(Arc::new(Module::from_args(args)?)))
            })
            .implementing(MODULE_CAPABILITY)
            .depends_on([LOGGER_CAPABILITY, BAD_EXCEPTION, DEPENDENCY_TYPE]),
        )
        .define(TypeDescriptor::concrete(DEPENDENCY_TYPE, |_| {
            Ok(Object::Value(Arc::new(Dependency)))
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::BadException;
    use alcove_core::{LogSink, MemorySink};

    struct SinkLogger(MemorySink);

    impl LoggerCapability for SinkLogger {
        fn log(&self, message: &str) {
            self.0.write_line(message);
        }

        fn log_error(&self, error: &(dyn StdError + Send + Sync)) {
            self.0.write_line(&format!("error: {}", error));
        }
    }

    #[test]
    fn test_module_reports_its_dependencies() {
        let sink = MemorySink::new();
        let args = [
            Object::Logger(Arc::new(SinkLogger(sink.clone()))),
            Object::Fault(Arc::new(BadException)),
            Object::Value(Arc::new(Dependency)),
        ];

        let image = module_image();
        let descriptor = image.find(MODULE_TYPE).unwrap();
        assert_eq!(
            descriptor.dependencies(),
            [LOGGER_CAPABILITY, BAD_EXCEPTION, DEPENDENCY_TYPE].map(String::from)
        );

        let module = (descriptor.constructor().unwrap())(&args)
            .unwrap()
            .as_module()
            .unwrap();
        module.report();

        assert_eq!(
            sink.lines(),
            vec![
                GREETING.to_string(),
                format!("error: {}", BadException),
                "module::Dependency".to_string(),
            ]
        );
    }

    #[test]
    fn test_module_rejects_bad_arguments() {
        let image = module_image();
        let ctor = image.find(MODULE_TYPE).unwrap().constructor().unwrap().clone();

        assert!(ctor(&[]).is_err());

        let swapped = [
            Object::Fault(Arc::new(BadException)),
            Object::Fault(Arc::new(BadException)),
            Object::Value(Arc::new(Dependency)),
        ];
        let err = ctor(&swapped).err().unwrap();
        assert!(err.to_string().contains("argument 1 is not a logger"));
    }
}
