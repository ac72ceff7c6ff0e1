//! Injected handles to external services (catalog table, coupon table,
//! payment processor, order storage).
//!
//! A handle is either configured with a concrete implementation or explicitly
//! unconfigured. Call sites match on that instead of receiving a stand-in
//! client that silently returns empty data.

use std::{fmt, sync::Arc};
use thiserror::Error;

/// Failure reading seed or catalog data from a backend
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read source data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed source data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure of a storage collaborator (coupon or order table)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Returned when a call site needs a collaborator that was never configured
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not configured")]
pub struct Unavailable(pub &'static str);

pub enum Collaborator<T: ?Sized> {
    Configured(Arc<T>),
    Unconfigured,
}

impl<T: ?Sized> Collaborator<T> {
    pub fn configured(inner: Arc<T>) -> Self {
        Self::Configured(inner)
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }

    /// Borrows the implementation, naming the collaborator in the error.
    pub fn get(&self, name: &'static str) -> Result<&Arc<T>, Unavailable> {
        match self {
            Self::Configured(inner) => Ok(inner),
            Self::Unconfigured => Err(Unavailable(name)),
        }
    }
}

impl<T: ?Sized> Clone for Collaborator<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Configured(inner) => Self::Configured(Arc::clone(inner)),
            Self::Unconfigured => Self::Unconfigured,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Collaborator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(_) => f.write_str("Configured"),
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}
