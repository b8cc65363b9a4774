//! Application state containing the collection store and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::CollectionRepository;
use crate::infrastructure::{MemoryCollectionRepository, SeaOrmCollectionRepository};
use crate::services::CollectionStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Collection store facade; the single entry point for request handlers.
    pub store: Arc<CollectionStore>,
}

impl AppState {
    /// Wire both backends into the store. `db` is None when the durable
    /// backend is disabled or was unreachable at startup; the memory table is
    /// constructed exactly once here and lives for the process lifetime.
    pub fn new(db: Option<DatabaseConnection>) -> Self {
        let durable = db.map(|conn| {
            Arc::new(SeaOrmCollectionRepository::new(conn)) as Arc<dyn CollectionRepository>
        });
        let memory = Arc::new(MemoryCollectionRepository::new());

        Self {
            store: Arc::new(CollectionStore::new(durable, memory)),
        }
    }
}
