//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no Axum, no SeaORM queries).
//! Only entity types, error kinds and the repository contract.

pub mod collections;
pub mod errors;
pub mod repositories;

pub use collections::{Collection, CreateCollectionInput, QuoteRef};
pub use errors::StoreError;
pub use repositories::CollectionRepository;
