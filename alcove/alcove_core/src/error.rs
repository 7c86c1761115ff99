//! Error types for the Alcove module host.
//!
//! The errors are organized by subsystem. The root error type, `Error`,
//! wraps each subsystem error so that an attempt can catch everything at
//! one boundary and turn it into a pass/fail result.

use thiserror::Error;

/// Root error type for Alcove.
#[derive(Debug, Error)]
pub enum Error {
    /// Context loading errors
    #[error("Isolation error: {0}")]
    Isolation(#[from] IsolationError),

    /// Dependency resolution errors
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Liveness probe errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// General runtime errors
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading images and types into a context.
#[derive(Debug, Error)]
pub enum IsolationError {
    /// The requested type is defined neither by the context nor by the host
    #[error("Type '{type_name}' not found in context '{context}'")]
    ModuleTypeNotFound {
        /// The requested type name
        type_name: String,

        /// The context that was asked
        context: String,
    },

    /// The package does not ship the requested image
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    /// The context has been unloaded and refuses further loads
    #[error("Context '{0}' has been unloaded")]
    ContextUnloaded(String),

    /// The same image was handed to a context twice
    #[error("Image '{0}' is already loaded")]
    DuplicateImage(String),
}

/// Errors raised while constructing an object graph.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A dependency could not be resolved or instantiated
    #[error("Failed to construct '{type_name}': {reason}")]
    Construction {
        /// The type being constructed
        type_name: String,

        /// Why construction failed
        reason: String,
    },

    /// The resolved object is not of the type the host expects
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type
        expected: String,

        /// Actual type
        actual: String,
    },

    /// The type has no constructor (interface without a registration)
    #[error("Type '{0}' is not constructible")]
    NotConstructible(String),

    /// Resolution recursed deeper than the configured limit
    #[error("Resolution of '{0}' exceeded the maximum depth of {1}")]
    DepthExceeded(String, usize),
}

/// Errors raised by the liveness probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The context was still reachable after every retry
    #[error("Context '{context}' still alive after {retries} collection attempts")]
    Timeout {
        /// The observed context
        context: String,

        /// The retry budget that was exhausted
        retries: usize,
    },
}

/// Coarse classification of an error, as reported per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    /// The module image lacks the expected type
    ModuleTypeNotFound,

    /// A dependency could not be resolved or instantiated
    ConstructionError,

    /// Liveness could not be confirmed within the retry budget
    ProbeTimeout,

    /// Anything else
    Other,
}

impl Error {
    /// Classify this error for attempt reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Isolation(IsolationError::ModuleTypeNotFound { .. }) => {
                FailureKind::ModuleTypeNotFound
            }
            Error::Resolution(_) => FailureKind::ConstructionError,
            Error::Probe(ProbeError::Timeout { .. }) => FailureKind::ProbeTimeout,
            _ => FailureKind::Other,
        }
    }

    /// Shorthand for a construction error.
    pub fn construction(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolutionError::Construction {
            type_name: type_name.into(),
            reason: reason.into(),
        }
        .into()
    }
}

/// Result type used throughout Alcove.
pub type Result<T> = std::result::Result<T, Error>;
