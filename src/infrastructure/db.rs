use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

/// Public so tests can rebuild a dropped schema against the same connection.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            owner_id TEXT,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Name uniqueness is per owner scope; NULL owners share one scope rather
    // than being exempt, hence the COALESCE. Comparison is case-insensitive,
    // storage keeps the original casing.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_collections_scope_name
        ON collections(COALESCE(owner_id, ''), name COLLATE NOCASE)
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS collection_quotes (
            id TEXT PRIMARY KEY,
            collection_id TEXT NOT NULL,
            text TEXT NOT NULL,
            author TEXT NOT NULL,
            position INTEGER NOT NULL,
            added_at TEXT NOT NULL,
            FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Quote membership is matched by content: one (text, author) pair per
    // collection, case-insensitively. Values are stored trimmed.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_collection_quotes_content
        ON collection_quotes(collection_id, LOWER(text), LOWER(author))
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE INDEX IF NOT EXISTS idx_collection_quotes_collection ON collection_quotes(collection_id)"
            .to_owned(),
    ))
    .await?;

    Ok(())
}
