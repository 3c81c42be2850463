//! Person and group use-case services.
//!
//! # Responsibility
//! - Validate request bodies through [`crate::serializer`] shapes.
//! - Orchestrate repository calls and return the serialized read model.
//!
//! # Invariants
//! - Existence of the target record is checked before its body is validated.
//! - Every write is followed by a read-back; responses never echo input.

use crate::repo::{EntityRef, RepoError};
use crate::serializer::ValidationErrors;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod group_service;
pub mod person_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from person/group use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Request body failed field validation.
    Validation(ValidationErrors),
    /// Target record does not exist.
    NotFound(EntityRef),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent roster state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}
