//! Repository trait definitions
//!
//! The contract both collection backends implement. The durable SeaORM
//! implementation and the in-memory table live in the infrastructure layer;
//! callers must not be able to tell them apart by behavior.

use async_trait::async_trait;

use super::{Collection, CreateCollectionInput, QuoteRef, StoreError};

/// Repository contract for the collection store.
///
/// All operations are keyed by collection `name` with case-insensitive,
/// whitespace-trimmed matching; names are stored in their original (trimmed)
/// casing. Every mutation refreshes the collection's `updated_at`.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Find a collection by name, quotes included in insertion order.
    async fn find_by_name(&self, name: &str) -> Result<Collection, StoreError>;

    /// All collections, ordered by creation time descending.
    async fn find_all(&self) -> Result<Vec<Collection>, StoreError>;

    /// Create a collection. `Conflict` when the (owner scope, name) pair is
    /// already taken under case-insensitive comparison; the null-owner scope
    /// is a scope like any other, not an exemption.
    async fn insert(&self, input: CreateCollectionInput) -> Result<Collection, StoreError>;

    /// Rename in place, preserving id and quotes. `Conflict` when another
    /// collection in the same scope already holds `new_name`.
    async fn rename(&self, name: &str, new_name: &str) -> Result<Collection, StoreError>;

    /// Delete the collection and all embedded quote refs atomically.
    async fn remove(&self, name: &str) -> Result<(), StoreError>;

    /// Append a quote snapshot. `Conflict` when an equivalent (text, author)
    /// pair is already present; duplicates are rejected, not ignored.
    async fn add_quote(&self, name: &str, text: &str, author: &str)
        -> Result<QuoteRef, StoreError>;

    /// Remove a quote by content. Collection-missing and quote-missing are
    /// distinct, separately reported conditions.
    async fn remove_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<QuoteRef, StoreError>;
}
