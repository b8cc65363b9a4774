//! Collection and quote-reference entities shared by both backends.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, user-curated list of quote snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    /// Insertion order is meaningful; append-only except for removal.
    pub quotes: Vec<QuoteRef>,
    pub created_at: String,
    pub updated_at: String,
}

impl Collection {
    pub fn new(input: CreateCollectionInput) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name: trimmed(&input.name).to_string(),
            owner_id: input.owner_id,
            is_public: input.is_public,
            quotes: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A quote's text/author snapshot embedded in a collection. Not a reference
/// into the quote corpus; membership is matched by content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRef {
    pub id: String,
    pub text: String,
    pub author: String,
    pub added_at: String,
}

impl QuoteRef {
    pub fn new(text: &str, author: &str) -> Self {
        Self {
            id: quote_ref_id(),
            text: trimmed(text).to_string(),
            author: trimmed(author).to_string(),
            added_at: Utc::now().to_rfc3339(),
        }
    }

    /// Content equality: case-insensitive, whitespace-trimmed (text, author) pair.
    pub fn matches(&self, text: &str, author: &str) -> bool {
        same(&self.text, text) && same(&self.author, author)
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateCollectionInput {
    pub name: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
}

/// Opaque quote-ref id: millisecond timestamp plus a random hex suffix.
fn quote_ref_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::random();
    format!("{millis:x}-{suffix:08x}")
}

pub fn trimmed(value: &str) -> &str {
    value.trim()
}

/// Folds a value for comparison: trimmed and lowercased. Storage keeps the
/// original casing; only comparisons fold.
pub fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn same(a: &str, b: &str) -> bool {
    fold(a) == fold(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_trims_and_lowercases() {
        assert_eq!(fold("  Favorites "), "favorites");
        assert_eq!(fold("TRAVEL"), "travel");
    }

    #[test]
    fn same_ignores_case_and_whitespace() {
        assert!(same("  The Road ", "the road"));
        assert!(!same("The Road", "The Roads"));
    }

    #[test]
    fn quote_ref_trims_on_construction() {
        let quote = QuoteRef::new("  To be or not to be  ", " Shakespeare ");
        assert_eq!(quote.text, "To be or not to be");
        assert_eq!(quote.author, "Shakespeare");
        assert!(quote.matches("to be or not to be", "SHAKESPEARE"));
    }

    #[test]
    fn quote_ref_ids_are_distinct() {
        let a = QuoteRef::new("a", "b");
        let b = QuoteRef::new("a", "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn collection_starts_empty_with_trimmed_name() {
        let collection = Collection::new(CreateCollectionInput {
            name: "  Favorites ".to_string(),
            owner_id: None,
            is_public: false,
        });
        assert_eq!(collection.name, "Favorites");
        assert!(collection.quotes.is_empty());
        assert_eq!(collection.created_at, collection.updated_at);
    }
}
