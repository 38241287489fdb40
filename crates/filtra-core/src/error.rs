use crate::{
    config::ConfigError,
    db::{predicate::ValidateError, source::SourceError, window::WindowError},
    model::RegistryError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Classified error returned from query execution and the client surface.
/// The per-concern error is kept in `detail` when one exists.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Structured cause; its variant corresponds to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Unknown entity name at the client surface.
    pub(crate) fn unknown_entity(entity: &str) -> Self {
        Self::from(ValidateError::UnknownEntity {
            entity: entity.to_string(),
        })
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn validate_error(&self) -> Option<&ValidateError> {
        match &self.detail {
            Some(ErrorDetail::Validate(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }

    fn with_detail(class: ErrorClass, origin: ErrorOrigin, detail: ErrorDetail) -> Self {
        Self {
            class,
            origin,
            message: detail.to_string(),
            detail: Some(detail),
        }
    }
}

///
/// ErrorDetail
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Validate(ValidateError),
    #[error("{0}")]
    Window(WindowError),
    #[error("{0}")]
    Source(SourceError),
    #[error("{0}")]
    Registry(RegistryError),
    #[error("{0}")]
    Config(ConfigError),
}

impl From<ValidateError> for Error {
    fn from(err: ValidateError) -> Self {
        Self::with_detail(
            ErrorClass::Validation,
            ErrorOrigin::Compile,
            ErrorDetail::Validate(err),
        )
    }
}

impl From<WindowError> for Error {
    fn from(err: WindowError) -> Self {
        Self::with_detail(
            ErrorClass::NotFound,
            ErrorOrigin::Window,
            ErrorDetail::Window(err),
        )
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        let class = match err {
            SourceError::UnknownEntity { .. } => ErrorClass::NotFound,
            SourceError::Backend { .. } => ErrorClass::Unavailable,
        };

        Self::with_detail(class, ErrorOrigin::Source, ErrorDetail::Source(err))
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::with_detail(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Registry,
            ErrorDetail::Registry(err),
        )
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::with_detail(
            ErrorClass::Validation,
            ErrorOrigin::Config,
            ErrorDetail::Config(err),
        )
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    Unavailable,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Compile,
    Window,
    Source,
    Registry,
    Config,
    Query,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Compile => "compile",
            Self::Window => "window",
            Self::Source => "source",
            Self::Registry => "registry",
            Self::Config => "config",
            Self::Query => "query",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_errors_classify_as_validation() {
        let err = Error::from(ValidateError::EmptyCursor);

        assert!(err.is_validation());
        assert_eq!(err.origin, ErrorOrigin::Compile);
        assert_eq!(err.validate_error(), Some(&ValidateError::EmptyCursor));
        assert_eq!(
            err.display_with_class(),
            "compile:validation: cursor must name at least one unique field"
        );
    }

    #[test]
    fn cursor_miss_classifies_as_not_found() {
        let err = Error::from(WindowError::CursorNotFound {
            entity: "User".to_string(),
        });

        assert!(err.is_not_found());
        assert_eq!(err.origin, ErrorOrigin::Window);
        assert!(err.message.contains("User"));
    }

    #[test]
    fn backend_failures_are_unavailable() {
        let err = Error::from(SourceError::Backend {
            entity: "Post".to_string(),
            message: "timeout".to_string(),
        });

        assert_eq!(err.class, ErrorClass::Unavailable);
        assert!(err.validate_error().is_none());
    }
}
