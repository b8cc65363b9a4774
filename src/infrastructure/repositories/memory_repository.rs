//! In-memory implementation of CollectionRepository (the fallback backend)
//!
//! A process-wide table of collections keyed by generated id. Constructed once
//! at startup and injected into the store facade; it lives for the process
//! lifetime and is shared by every request. It is the canonical store when the
//! durable backend is disabled, and the safety net when it fails.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::collections::fold;
use crate::domain::collections::trimmed;
use crate::domain::{
    Collection, CollectionRepository, CreateCollectionInput, QuoteRef, StoreError,
};

pub struct MemoryCollectionRepository {
    // Whole check-then-mutate sequences run under the write lock, which
    // serializes mutations; lookups never suspend. No await ever happens
    // while a guard is held.
    table: RwLock<HashMap<String, Collection>>,
}

impl MemoryCollectionRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Internal("collection table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Internal("collection table lock poisoned".to_string()))
    }
}

impl Default for MemoryCollectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear-scan name lookup across all owner scopes; the oldest match wins,
/// mirroring the durable repository's ordering.
fn find_id(table: &HashMap<String, Collection>, name: &str) -> Option<String> {
    let folded = fold(name);
    table
        .values()
        .filter(|c| fold(&c.name) == folded)
        .min_by(|a, b| a.created_at.cmp(&b.created_at))
        .map(|c| c.id.clone())
}

/// Whether `name` is taken within the given owner scope, optionally excluding
/// one collection (the rename target itself).
fn name_taken(
    table: &HashMap<String, Collection>,
    owner_id: &Option<String>,
    name: &str,
    exclude_id: Option<&str>,
) -> bool {
    let folded = fold(name);
    table.values().any(|c| {
        c.owner_id == *owner_id && fold(&c.name) == folded && Some(c.id.as_str()) != exclude_id
    })
}

#[async_trait]
impl CollectionRepository for MemoryCollectionRepository {
    async fn find_by_name(&self, name: &str) -> Result<Collection, StoreError> {
        let table = self.read()?;
        find_id(&table, name)
            .and_then(|id| table.get(&id).cloned())
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))
    }

    async fn find_all(&self) -> Result<Vec<Collection>, StoreError> {
        let table = self.read()?;
        let mut collections: Vec<Collection> = table.values().cloned().collect();
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(collections)
    }

    async fn insert(&self, input: CreateCollectionInput) -> Result<Collection, StoreError> {
        let mut table = self.write()?;
        let record = Collection::new(input);
        if name_taken(&table, &record.owner_id, &record.name, None) {
            return Err(StoreError::Conflict(format!(
                "collection \"{}\" already exists",
                record.name
            )));
        }
        table.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn rename(&self, name: &str, new_name: &str) -> Result<Collection, StoreError> {
        let mut table = self.write()?;
        let id = find_id(&table, name)
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;

        let new_name = trimmed(new_name).to_string();
        let owner_id = table[&id].owner_id.clone();
        if name_taken(&table, &owner_id, &new_name, Some(&id)) {
            return Err(StoreError::Conflict(format!(
                "collection \"{}\" already exists",
                new_name
            )));
        }

        let collection = table
            .get_mut(&id)
            .ok_or_else(|| StoreError::Internal("collection vanished during rename".to_string()))?;
        collection.name = new_name;
        collection.updated_at = Utc::now().to_rfc3339();
        Ok(collection.clone())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        let mut table = self.write()?;
        let id = find_id(&table, name)
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;
        table.remove(&id);
        Ok(())
    }

    async fn add_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<QuoteRef, StoreError> {
        let mut table = self.write()?;
        let id = find_id(&table, name)
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;
        let collection = table
            .get_mut(&id)
            .ok_or_else(|| StoreError::Internal("collection vanished during add".to_string()))?;

        if collection.quotes.iter().any(|q| q.matches(text, author)) {
            return Err(StoreError::Conflict(format!(
                "quote is already in collection \"{}\"",
                collection.name
            )));
        }

        let quote = QuoteRef::new(text, author);
        collection.quotes.push(quote.clone());
        collection.updated_at = Utc::now().to_rfc3339();
        Ok(quote)
    }

    async fn remove_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<QuoteRef, StoreError> {
        let mut table = self.write()?;
        let id = find_id(&table, name)
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;
        let collection = table
            .get_mut(&id)
            .ok_or_else(|| StoreError::Internal("collection vanished during remove".to_string()))?;

        let index = collection
            .quotes
            .iter()
            .position(|q| q.matches(text, author))
            .ok_or_else(|| StoreError::QuoteNotFound {
                collection: collection.name.clone(),
                text: trimmed(text).to_string(),
                author: trimmed(author).to_string(),
            })?;

        let removed = collection.quotes.remove(index);
        collection.updated_at = Utc::now().to_rfc3339();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CreateCollectionInput {
        CreateCollectionInput {
            name: name.to_string(),
            owner_id: None,
            is_public: false,
        }
    }

    fn owned_input(name: &str, owner: &str) -> CreateCollectionInput {
        CreateCollectionInput {
            name: name.to_string(),
            owner_id: Some(owner.to_string()),
            is_public: false,
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let repo = MemoryCollectionRepository::new();
        let created = repo.insert(input("Favorites")).await.unwrap();
        let fetched = repo.find_by_name("fAVORITES").await.unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn case_variant_names_conflict_within_a_scope() {
        let repo = MemoryCollectionRepository::new();
        repo.insert(input("Travel")).await.unwrap();
        let err = repo.insert(input("travel")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn same_name_is_allowed_in_different_owner_scopes() {
        let repo = MemoryCollectionRepository::new();
        repo.insert(owned_input("Travel", "alice")).await.unwrap();
        repo.insert(owned_input("Travel", "bob")).await.unwrap();
        // The null scope is enforced too, not exempted.
        repo.insert(input("Travel")).await.unwrap();
        let err = repo.insert(input("TRAVEL")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn rename_keeps_id_and_quotes_and_frees_the_old_name() {
        let repo = MemoryCollectionRepository::new();
        let created = repo.insert(input("Travel")).await.unwrap();
        repo.add_quote("Travel", "Not all those who wander are lost", "Tolkien")
            .await
            .unwrap();

        let renamed = repo.rename("Travel", "Trips").await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.quotes.len(), 1);

        assert!(matches!(
            repo.find_by_name("Travel").await.unwrap_err(),
            StoreError::CollectionNotFound(_)
        ));
        // Old name is reusable after the rename.
        repo.insert(input("Travel")).await.unwrap();
    }

    #[tokio::test]
    async fn rename_to_own_name_with_different_casing_is_allowed() {
        let repo = MemoryCollectionRepository::new();
        let created = repo.insert(input("travel")).await.unwrap();
        let renamed = repo.rename("travel", "Travel").await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "Travel");
    }

    #[tokio::test]
    async fn duplicate_quote_content_is_rejected_not_ignored() {
        let repo = MemoryCollectionRepository::new();
        repo.insert(input("Favorites")).await.unwrap();
        repo.add_quote("Favorites", "A", "B").await.unwrap();
        let err = repo.add_quote("Favorites", " a ", "b").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        let collection = repo.find_by_name("Favorites").await.unwrap();
        assert_eq!(collection.quotes.len(), 1);
    }

    #[tokio::test]
    async fn quote_order_is_insertion_order() {
        let repo = MemoryCollectionRepository::new();
        repo.insert(input("Favorites")).await.unwrap();
        repo.add_quote("Favorites", "first", "a").await.unwrap();
        repo.add_quote("Favorites", "second", "b").await.unwrap();
        repo.add_quote("Favorites", "third", "c").await.unwrap();
        repo.remove_quote("Favorites", "second", "b").await.unwrap();

        let collection = repo.find_by_name("Favorites").await.unwrap();
        let texts: Vec<&str> = collection.quotes.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn missing_quote_and_missing_collection_are_distinct() {
        let repo = MemoryCollectionRepository::new();
        repo.insert(input("Favorites")).await.unwrap();

        let err = repo.remove_quote("Favorites", "A", "B").await.unwrap_err();
        assert!(matches!(err, StoreError::QuoteNotFound { .. }));

        let err = repo.remove_quote("Nope", "A", "B").await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
    }
}
