//! Error types shared by every Courier layer.
//!
//! Runtime-level errors (configuration loading, polling) are defined in
//! `courier-runtime`.

use thiserror::Error;

/// Boxed error used for anything a handler may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid setup detected while wiring the bot. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A command name was blank or started with `/`.
    #[error("invalid command name {name:?}: {reason}")]
    InvalidCommandName {
        /// The rejected name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A required option was not provided.
    #[error("missing required option: {option}")]
    MissingOption {
        /// Dotted path of the option.
        option: String,
    },
}

impl ConfigurationError {
    /// Creates a missing option error.
    pub fn missing_option(option: impl Into<String>) -> Self {
        Self::MissingOption {
            option: option.into(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A caller passed an argument the operation cannot work with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value was absent.
    #[error("value cannot be null (parameter '{param}')")]
    NullArgument {
        /// Name of the missing parameter.
        param: &'static str,
    },

    /// An entity span does not fit the message text.
    #[error("entity span {offset}+{length} is out of range for the message text")]
    EntityOutOfRange { offset: usize, length: usize },
}

impl ValidationError {
    pub fn null(param: &'static str) -> Self {
        Self::NullArgument { param }
    }
}

// =============================================================================
// Service Errors
// =============================================================================

/// Failure to resolve something from an update scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("service '{type_name}' is not registered")]
    NotRegistered { type_name: &'static str },
}

pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
