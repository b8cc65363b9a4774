//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The split matters to the store facade: `Conflict`, the two not-found kinds
//! and `Validation` are terminal business outcomes, while `Unavailable` and
//! `Internal` are infrastructure failures that trigger the memory fallback.

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Bad input shape or length; the caller's fault, never retried.
    Validation(String),
    /// No collection with the given name.
    CollectionNotFound(String),
    /// The collection exists but does not contain the given quote content.
    QuoteNotFound {
        collection: String,
        text: String,
        author: String,
    },
    /// Uniqueness violation on a collection name or on quote content.
    Conflict(String),
    /// Durable backend connectivity failure; converted into a memory retry.
    Unavailable(String),
    /// Unexpected failure in either backend.
    Internal(String),
}

impl StoreError {
    /// Whether the facade may retry this operation against the memory table.
    /// Business outcomes never fall back; infrastructure failures always do.
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Internal(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "{}", msg),
            StoreError::CollectionNotFound(name) => {
                write!(f, "collection \"{}\" not found", name)
            }
            StoreError::QuoteNotFound {
                collection,
                text,
                author,
            } => write!(
                f,
                "quote \"{}\" by {} is not in collection \"{}\"",
                text, author, collection
            ),
            StoreError::Conflict(msg) => write!(f, "{}", msg),
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            StoreError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// Classification of SeaORM errors (used in the infrastructure layer).
// A rejected write on one of the uniqueness indexes is a business conflict;
// a missing record is a not-found; everything else is treated as the durable
// backend being unavailable, which lets the facade fall back.
impl From<sea_orm::DbErr> for StoreError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict(
                "a stored uniqueness constraint rejected the write".to_string(),
            ),
            _ => match e {
                sea_orm::DbErr::RecordNotFound(what) => StoreError::CollectionNotFound(what),
                other => StoreError::Unavailable(other.to_string()),
            },
        }
    }
}
