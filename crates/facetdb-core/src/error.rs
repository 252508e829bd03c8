use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable internal classification.
/// Every component error enum converts into this via its `class()` and
/// `origin()` mapping so callers can branch on taxonomy, not message text.
///

#[derive(Clone, Debug, ThisError)]
#[error("{origin}:{class}: {message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    /// Construct an error with an explicit classification.
    pub fn classified(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Structural lookup failure surfaced to the caller.
    pub fn not_found(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::classified(ErrorClass::NotFound, origin, message)
    }

    /// Underlying store failure, including mid-transaction failures.
    pub fn store(message: impl Into<String>) -> Self {
        Self::classified(ErrorClass::Internal, ErrorOrigin::Store, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }
}

///
/// ErrorClass
/// Coarse classification used for propagation policy decisions.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Internal,
    InvariantViolation,
    NotFound,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Component that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Catalog,
    Coerce,
    Options,
    Profile,
    Resolver,
    Router,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Catalog => "catalog",
            Self::Coerce => "coerce",
            Self::Options => "options",
            Self::Profile => "profile",
            Self::Resolver => "resolver",
            Self::Router => "router",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}
