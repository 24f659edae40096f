use forgecat_core::{DomainError, ErrorKind};

use crate::repository::StoreError;

/// Failure of a configurator service operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Deterministic domain failure (validation, not-found, setup).
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The repository failed or refused the write.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The write succeeded but its change event could not be published.
    #[error("event publication failed: {0}")]
    Publish(String),
}

impl ServiceError {
    /// Domain classification, if this is a domain failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServiceError::Domain(err) => Some(err.kind()),
            ServiceError::Store(_) | ServiceError::Publish(_) => None,
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<forgecat_core::ValidationError> for ServiceError {
    fn from(value: forgecat_core::ValidationError) -> Self {
        ServiceError::Domain(value.into())
    }
}

impl From<forgecat_core::NotFound> for ServiceError {
    fn from(value: forgecat_core::NotFound) -> Self {
        ServiceError::Domain(value.into())
    }
}
