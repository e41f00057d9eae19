//! Typed failures raised by the record service.
//!
//! Cache misses are not errors here: the cache adapter returns `Option` and
//! the service recovers every miss locally by falling back to the backing
//! store. What does surface is the not-found family (client-facing) and
//! write/store failures (server-facing). Each error carries a numeric status
//! code so the response boundary can render it without introspecting
//! internals.

use std::fmt;

use thiserror::Error;

/// Which write operation the backing store rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            WriteOp::Insert => "insert",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        };
        f.write_str(op)
    }
}

/// Failures raised by [`RecordService`](crate::service::RecordService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A single-entity lookup found nothing, in cache or backing store.
    #[error("{model} with {field} = {value} does not exist")]
    NotFound {
        model: &'static str,
        field: String,
        value: String,
    },

    /// A collection lookup matched no rows.
    #[error("{model} with {field} = {value} does not exist")]
    CollectionNotFound {
        model: &'static str,
        field: String,
        value: String,
    },

    /// The backing store reported a failed insert/update/delete.
    #[error("Failed to {0} model")]
    WriteFailed(WriteOp),

    /// The working-model slot was read before being set.
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// The backing store itself failed (driver/transport error).
    #[error("backing store error: {0}")]
    Store(anyhow::Error),
}

impl ServiceError {
    pub fn not_found(model: &'static str, field: &str, value: impl fmt::Display) -> Self {
        Self::NotFound {
            model,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn collection_not_found(model: &'static str, field: &str, value: impl fmt::Display) -> Self {
        Self::CollectionNotFound {
            model,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Numeric status code the response boundary renders with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::CollectionNotFound { .. } => 404,
            Self::WriteFailed(_) | Self::ModelNotLoaded | Self::Store(_) => 500,
        }
    }

    /// Whether this is a client-facing not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::CollectionNotFound { .. })
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err)
    }
}
