use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use quotarium::db;
use quotarium::domain::{CollectionRepository, CreateCollectionInput, StoreError};
use quotarium::infrastructure::{MemoryCollectionRepository, SeaOrmCollectionRepository};
use quotarium::services::{CollectionStore, StoreSource};

// Helper to build a store with a durable backend over an in-memory SQLite
// database; the connection is returned so tests can break and repair it.
async fn durable_store() -> (CollectionStore, DatabaseConnection) {
    let conn = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let durable: Arc<dyn CollectionRepository> =
        Arc::new(SeaOrmCollectionRepository::new(conn.clone()));
    let store = CollectionStore::new(Some(durable), Arc::new(MemoryCollectionRepository::new()));
    (store, conn)
}

// Helper to build a store with the durable backend disabled outright.
fn memory_store() -> CollectionStore {
    CollectionStore::new(None, Arc::new(MemoryCollectionRepository::new()))
}

fn input(name: &str) -> CreateCollectionInput {
    CreateCollectionInput {
        name: name.to_string(),
        owner_id: None,
        is_public: false,
    }
}

// Simulate a durable connectivity failure: every query errors once the
// schema is gone, which the store must classify as a fallback trigger.
async fn break_durable(conn: &DatabaseConnection) {
    for sql in [
        "DROP TABLE IF EXISTS collection_quotes",
        "DROP TABLE IF EXISTS collections",
    ] {
        conn.execute(Statement::from_string(
            conn.get_database_backend(),
            sql.to_owned(),
        ))
        .await
        .expect("Failed to drop table");
    }
}

async fn repair_durable(conn: &DatabaseConnection) {
    db::run_migrations(conn)
        .await
        .expect("Failed to rebuild schema");
}

#[tokio::test]
async fn fetch_by_any_casing_returns_the_same_id() {
    let (store, _conn) = durable_store().await;

    let created = store.create_collection(input("Favorites")).await.unwrap();
    assert_eq!(created.source, StoreSource::Durable);

    for casing in ["favorites", "FAVORITES", "  Favorites  ", "fAvOrItEs"] {
        let fetched = store.get_collection(casing).await.unwrap();
        assert_eq!(fetched.record.id, created.record.id);
    }
}

#[tokio::test]
async fn case_variant_create_yields_one_success_and_one_conflict() {
    let (store, conn) = durable_store().await;

    store.create_collection(input("Travel")).await.unwrap();
    let err = store.create_collection(input("travel")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // The conflict was a business outcome, not a connectivity failure: the
    // duplicate must not have been written to the memory table behind the
    // durable backend's back.
    break_durable(&conn).await;
    let err = store.get_collection("travel").await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound(_)));
}

#[tokio::test]
async fn duplicate_quote_content_conflicts_and_leaves_one_quote() {
    let (store, _conn) = durable_store().await;

    store.create_collection(input("Favorites")).await.unwrap();
    store.add_quote("Favorites", "A", "B").await.unwrap();

    let err = store.add_quote("Favorites", " a ", "b").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let collection = store.get_collection("Favorites").await.unwrap().record;
    assert_eq!(collection.quotes.len(), 1);
    assert_eq!(collection.quotes[0].text, "A");
}

#[tokio::test]
async fn missing_quote_is_distinct_from_missing_collection() {
    let (store, _conn) = durable_store().await;

    store.create_collection(input("Favorites")).await.unwrap();

    let err = store
        .remove_quote("Favorites", "never", "added")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::QuoteNotFound { .. }));

    let err = store
        .remove_quote("Nowhere", "never", "added")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound(_)));
}

#[tokio::test]
async fn rename_preserves_id_and_quote_sequence() {
    let (store, _conn) = durable_store().await;

    let created = store.create_collection(input("Travel")).await.unwrap();
    store.add_quote("Travel", "first", "a").await.unwrap();
    store.add_quote("Travel", "second", "b").await.unwrap();

    let renamed = store.rename_collection("Travel", "Trips").await.unwrap();
    assert_eq!(renamed.record.id, created.record.id);
    let texts: Vec<&str> = renamed
        .record
        .quotes
        .iter()
        .map(|q| q.text.as_str())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);

    let err = store.get_collection("Travel").await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound(_)));

    let fetched = store.get_collection("Trips").await.unwrap();
    assert_eq!(fetched.record.id, created.record.id);
}

#[tokio::test]
async fn rename_conflict_excludes_the_collection_itself() {
    let (store, _conn) = durable_store().await;

    store.create_collection(input("Travel")).await.unwrap();
    store.create_collection(input("Trips")).await.unwrap();

    let err = store
        .rename_collection("Travel", "TRIPS")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // Recasing a collection's own name is not a conflict.
    let renamed = store.rename_collection("Trips", "trips").await.unwrap();
    assert_eq!(renamed.record.name, "trips");
}

#[tokio::test]
async fn delete_removes_from_listing_and_later_gets() {
    let (store, _conn) = durable_store().await;

    store.create_collection(input("Travel")).await.unwrap();
    store.create_collection(input("Favorites")).await.unwrap();
    store.add_quote("Travel", "quote", "author").await.unwrap();

    let deleted = store.delete_collection("Travel").await.unwrap();
    assert_eq!(deleted.source, StoreSource::Durable);

    let listed = store.list_collections().await.unwrap().record;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Favorites");

    let err = store.get_collection("Travel").await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound(_)));

    let err = store.delete_collection("Travel").await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound(_)));
}

#[tokio::test]
async fn listing_orders_newest_first() {
    let (store, _conn) = durable_store().await;

    store.create_collection(input("Oldest")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.create_collection(input("Newest")).await.unwrap();

    let listed = store.list_collections().await.unwrap().record;
    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Newest", "Oldest"]);
}

#[tokio::test]
async fn connectivity_failure_falls_back_to_memory_until_recovery() {
    let (store, conn) = durable_store().await;

    store.create_collection(input("Durable")).await.unwrap();

    break_durable(&conn).await;

    // Every operation is served from memory while durable is failing.
    let created = store.create_collection(input("Offline")).await.unwrap();
    assert_eq!(created.source, StoreSource::Memory);

    let added = store.add_quote("Offline", "A", "B").await.unwrap();
    assert_eq!(added.source, StoreSource::Memory);

    let fetched = store.get_collection("Offline").await.unwrap();
    assert_eq!(fetched.source, StoreSource::Memory);
    assert_eq!(fetched.record.quotes.len(), 1);

    let listed = store.list_collections().await.unwrap();
    assert_eq!(listed.source, StoreSource::Memory);

    let renamed = store.rename_collection("Offline", "Roaming").await.unwrap();
    assert_eq!(renamed.source, StoreSource::Memory);
    assert_eq!(renamed.record.quotes.len(), 1);

    let removed = store.remove_quote("Roaming", "a", "B").await.unwrap();
    assert_eq!(removed.source, StoreSource::Memory);

    let deleted = store.delete_collection("Roaming").await.unwrap();
    assert_eq!(deleted.source, StoreSource::Memory);

    // Recovery needs no manual intervention: the next call that finds the
    // durable backend healthy is served from it again.
    repair_durable(&conn).await;

    let created = store.create_collection(input("BackAgain")).await.unwrap();
    assert_eq!(created.source, StoreSource::Durable);

    let fetched = store.get_collection("BackAgain").await.unwrap();
    assert_eq!(fetched.source, StoreSource::Durable);
}

#[tokio::test]
async fn memory_conflicts_survive_while_durable_is_down() {
    let (store, conn) = durable_store().await;
    break_durable(&conn).await;

    store.create_collection(input("Travel")).await.unwrap();
    let err = store.create_collection(input("TRAVEL")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    store.add_quote("Travel", "A", "B").await.unwrap();
    let err = store.add_quote("Travel", "a", " B ").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn disabled_durable_backend_serves_everything_from_memory() {
    let store = memory_store();
    assert!(!store.is_durable_enabled());

    let created = store.create_collection(input("Favorites")).await.unwrap();
    assert_eq!(created.source, StoreSource::Memory);

    store.add_quote("Favorites", "A", "B").await.unwrap();
    let renamed = store
        .rename_collection("Favorites", "Keepers")
        .await
        .unwrap();
    assert_eq!(renamed.source, StoreSource::Memory);
    assert_eq!(renamed.record.id, created.record.id);

    let removed = store.remove_quote("Keepers", "a", "b").await.unwrap();
    assert_eq!(removed.source, StoreSource::Memory);

    let deleted = store.delete_collection("Keepers").await.unwrap();
    assert_eq!(deleted.source, StoreSource::Memory);
}

#[tokio::test]
async fn validation_rejects_bad_names_and_empty_quote_fields() {
    let (store, _conn) = durable_store().await;

    let err = store.create_collection(input("   ")).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = store
        .create_collection(input(&"x".repeat(101)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    store.create_collection(input("Favorites")).await.unwrap();
    let err = store.add_quote("Favorites", "  ", "author").await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    let err = store.add_quote("Favorites", "text", "").await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn names_with_pattern_metacharacters_match_exactly() {
    let (store, _conn) = durable_store().await;

    store.create_collection(input("100%_true")).await.unwrap();
    store.create_collection(input("100 true")).await.unwrap();

    // "%" and "_" in the lookup are literals, not wildcards; the lookup must
    // not match "100 true".
    let fetched = store.get_collection("100%_TRUE").await.unwrap();
    assert_eq!(fetched.record.name, "100%_true");

    let err = store.get_collection("100%%true").await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound(_)));
}

#[tokio::test]
async fn owner_scopes_are_independent_but_null_scope_is_enforced() {
    let (store, _conn) = durable_store().await;

    store
        .create_collection(CreateCollectionInput {
            name: "Travel".to_string(),
            owner_id: Some("alice".to_string()),
            is_public: false,
        })
        .await
        .unwrap();

    // Same name in another owner scope is fine.
    store
        .create_collection(CreateCollectionInput {
            name: "travel".to_string(),
            owner_id: Some("bob".to_string()),
            is_public: true,
        })
        .await
        .unwrap();

    // And in the null scope, once.
    store.create_collection(input("Travel")).await.unwrap();
    let err = store.create_collection(input("travel")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}
