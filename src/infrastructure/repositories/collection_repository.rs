//! SeaORM implementation of CollectionRepository (the durable backend)

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::collections::{fold, trimmed};
use crate::domain::{
    Collection, CollectionRepository, CreateCollectionInput, QuoteRef, StoreError,
};
use crate::models::collection::{self, Entity as CollectionEntity};
use crate::models::collection_quote::{self, Entity as CollectionQuoteEntity};

/// Escape character for LIKE patterns built from user-supplied names.
const LIKE_ESCAPE: char = '\\';

/// Sanitize a user-supplied name into an anchored LIKE pattern: every pattern
/// metacharacter (`%`, `_`, and the escape character itself) is escaped, so
/// the match is always an exact, case-insensitive comparison and never a
/// wildcard search.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// Anchored, fully-escaped name match. SQLite LIKE folds ASCII case, which
/// mirrors the memory table's folded comparison for ASCII names.
fn name_matches(name: &str) -> SimpleExpr {
    Expr::col(collection::Column::Name)
        .like(LikeExpr::new(escape_like(trimmed(name))).escape(LIKE_ESCAPE))
}

/// Owner scope filter. The null-owner scope is matched explicitly; it gets
/// uniqueness enforcement like any other scope.
fn scope_matches(owner_id: Option<&String>) -> SimpleExpr {
    match owner_id {
        Some(owner) => collection::Column::OwnerId.eq(owner.clone()),
        None => collection::Column::OwnerId.is_null(),
    }
}

/// Case-insensitive (text, author) content match within one collection.
fn quote_content_matches(collection_id: &str, text: &str, author: &str) -> Condition {
    Condition::all()
        .add(collection_quote::Column::CollectionId.eq(collection_id))
        .add(Expr::expr(Func::lower(Expr::col(collection_quote::Column::Text))).eq(fold(text)))
        .add(Expr::expr(Func::lower(Expr::col(collection_quote::Column::Author))).eq(fold(author)))
}

impl From<collection_quote::Model> for QuoteRef {
    fn from(model: collection_quote::Model) -> Self {
        QuoteRef {
            id: model.id,
            text: model.text,
            author: model.author,
            added_at: model.added_at,
        }
    }
}

/// SeaORM-based implementation of CollectionRepository
pub struct SeaOrmCollectionRepository {
    db: DatabaseConnection,
}

impl SeaOrmCollectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Name lookup across all owner scopes; when several scopes hold the same
    /// name, the oldest collection wins, deterministically.
    async fn find_model(&self, name: &str) -> Result<Option<collection::Model>, StoreError> {
        let model = CollectionEntity::find()
            .filter(name_matches(name))
            .order_by_asc(collection::Column::CreatedAt)
            .one(&self.db)
            .await?;
        Ok(model)
    }

    async fn load_quotes(&self, collection_id: &str) -> Result<Vec<QuoteRef>, StoreError> {
        let rows = CollectionQuoteEntity::find()
            .filter(collection_quote::Column::CollectionId.eq(collection_id))
            .order_by_asc(collection_quote::Column::Position)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(QuoteRef::from).collect())
    }

    async fn assemble(&self, model: collection::Model) -> Result<Collection, StoreError> {
        let quotes = self.load_quotes(&model.id).await?;
        Ok(Collection {
            id: model.id,
            name: model.name,
            owner_id: model.owner_id,
            is_public: model.is_public,
            quotes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn touch(&self, model: collection::Model) -> Result<collection::Model, StoreError> {
        let mut active: collection::ActiveModel = model.into();
        active.updated_at = Set(Utc::now().to_rfc3339());
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}

#[async_trait]
impl CollectionRepository for SeaOrmCollectionRepository {
    async fn find_by_name(&self, name: &str) -> Result<Collection, StoreError> {
        let model = self
            .find_model(name)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;
        self.assemble(model).await
    }

    async fn find_all(&self) -> Result<Vec<Collection>, StoreError> {
        let models = CollectionEntity::find()
            .order_by_desc(collection::Column::CreatedAt)
            .all(&self.db)
            .await?;

        // One query for all quotes instead of one per collection.
        let rows = CollectionQuoteEntity::find()
            .order_by_asc(collection_quote::Column::Position)
            .all(&self.db)
            .await?;
        let mut quotes_by_collection: HashMap<String, Vec<QuoteRef>> = HashMap::new();
        for row in rows {
            quotes_by_collection
                .entry(row.collection_id.clone())
                .or_default()
                .push(row.into());
        }

        Ok(models
            .into_iter()
            .map(|model| Collection {
                quotes: quotes_by_collection.remove(&model.id).unwrap_or_default(),
                id: model.id,
                name: model.name,
                owner_id: model.owner_id,
                is_public: model.is_public,
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
            .collect())
    }

    async fn insert(&self, input: CreateCollectionInput) -> Result<Collection, StoreError> {
        let record = Collection::new(input);

        let existing = CollectionEntity::find()
            .filter(scope_matches(record.owner_id.as_ref()))
            .filter(name_matches(&record.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(StoreError::Conflict(format!(
                "collection \"{}\" already exists",
                record.name
            )));
        }

        // The uniqueness index backstops the pre-check: a concurrent insert
        // surfaces here as a Conflict via the DbErr classification.
        collection::ActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            owner_id: Set(record.owner_id.clone()),
            is_public: Set(record.is_public),
            created_at: Set(record.created_at.clone()),
            updated_at: Set(record.updated_at.clone()),
        }
        .insert(&self.db)
        .await?;

        Ok(record)
    }

    async fn rename(&self, name: &str, new_name: &str) -> Result<Collection, StoreError> {
        let model = self
            .find_model(name)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;

        let new_name = trimmed(new_name).to_string();
        let taken = CollectionEntity::find()
            .filter(scope_matches(model.owner_id.as_ref()))
            .filter(name_matches(&new_name))
            .filter(collection::Column::Id.ne(model.id.clone()))
            .one(&self.db)
            .await?;
        if taken.is_some() {
            return Err(StoreError::Conflict(format!(
                "collection \"{}\" already exists",
                new_name
            )));
        }

        let mut active: collection::ActiveModel = model.into();
        active.name = Set(new_name);
        active.updated_at = Set(Utc::now().to_rfc3339());
        let updated = active.update(&self.db).await?;

        self.assemble(updated).await
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        let model = self
            .find_model(name)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;

        // Collection and embedded quote refs go together or not at all.
        let txn = self.db.begin().await?;
        CollectionQuoteEntity::delete_many()
            .filter(collection_quote::Column::CollectionId.eq(model.id.clone()))
            .exec(&txn)
            .await?;
        CollectionEntity::delete_by_id(model.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    async fn add_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<QuoteRef, StoreError> {
        let model = self
            .find_model(name)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;

        let duplicate = CollectionQuoteEntity::find()
            .filter(quote_content_matches(&model.id, text, author))
            .one(&self.db)
            .await?;
        if duplicate.is_some() {
            return Err(StoreError::Conflict(format!(
                "quote is already in collection \"{}\"",
                model.name
            )));
        }

        let position = CollectionQuoteEntity::find()
            .filter(collection_quote::Column::CollectionId.eq(model.id.clone()))
            .count(&self.db)
            .await? as i32;

        let quote = QuoteRef::new(text, author);
        collection_quote::ActiveModel {
            id: Set(quote.id.clone()),
            collection_id: Set(model.id.clone()),
            text: Set(quote.text.clone()),
            author: Set(quote.author.clone()),
            position: Set(position),
            added_at: Set(quote.added_at.clone()),
        }
        .insert(&self.db)
        .await?;

        self.touch(model).await?;
        Ok(quote)
    }

    async fn remove_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<QuoteRef, StoreError> {
        let model = self
            .find_model(name)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(trimmed(name).to_string()))?;

        let row = CollectionQuoteEntity::find()
            .filter(quote_content_matches(&model.id, text, author))
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::QuoteNotFound {
                collection: model.name.clone(),
                text: trimmed(text).to_string(),
                author: trimmed(author).to_string(),
            })?;

        CollectionQuoteEntity::delete_by_id(row.id.clone())
            .exec(&self.db)
            .await?;
        self.touch(model).await?;

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_passes_plain_names_through() {
        assert_eq!(escape_like("Favorites"), "Favorites");
        assert_eq!(escape_like("Road Trips 2024"), "Road Trips 2024");
    }

    #[test]
    fn escape_like_escapes_every_metacharacter() {
        assert_eq!(escape_like("100%_true"), "100\\%\\_true");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("%%"), "\\%\\%");
        assert_eq!(escape_like("_"), "\\_");
    }

    #[test]
    fn escape_like_leaves_regex_metacharacters_alone() {
        // Regex metacharacters are ordinary characters to LIKE; only pattern
        // characters need escaping.
        assert_eq!(escape_like("c++ (tips) [best].*"), "c++ (tips) [best].*");
    }
}
