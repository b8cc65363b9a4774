//! Collection Store facade - the single entry point for request handlers
//!
//! Every operation validates its input, asks the backend selector whether the
//! durable repository should be tried, and tags its result with the backend
//! that served it. Infrastructure failures on the durable path are logged and
//! retried against the memory table; business outcomes (conflicts, not-found,
//! validation) propagate immediately no matter which backend produced them.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::{
    Collection, CollectionRepository, CreateCollectionInput, QuoteRef, StoreError,
};
use crate::infrastructure::MemoryCollectionRepository;
use crate::services::BackendSelector;

pub const NAME_MAX_LEN: usize = 100;

/// Which backend served a successful operation. Part of the response
/// contract: callers observe `"durable"` or `"memory"` on every success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreSource {
    Durable,
    Memory,
}

impl StoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreSource::Durable => "durable",
            StoreSource::Memory => "memory",
        }
    }
}

/// A successful store result tagged with its origin.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub source: StoreSource,
    pub record: T,
}

impl<T> Sourced<T> {
    fn durable(record: T) -> Self {
        Self {
            source: StoreSource::Durable,
            record,
        }
    }

    fn memory(record: T) -> Self {
        Self {
            source: StoreSource::Memory,
            record,
        }
    }
}

fn valid_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation(
            "collection name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(StoreError::Validation(format!(
            "collection name must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(name.to_string())
}

fn valid_quote_field(value: &str, field: &str) -> Result<String, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Validation(format!(
            "quote {} must not be empty",
            field
        )));
    }
    Ok(value.to_string())
}

pub struct CollectionStore {
    selector: BackendSelector,
    memory: Arc<MemoryCollectionRepository>,
}

impl CollectionStore {
    pub fn new(
        durable: Option<Arc<dyn CollectionRepository>>,
        memory: Arc<MemoryCollectionRepository>,
    ) -> Self {
        Self {
            selector: BackendSelector::new(durable),
            memory,
        }
    }

    /// Whether the next operation would try the durable backend.
    pub fn is_durable_enabled(&self) -> bool {
        self.selector.is_durable_enabled()
    }

    pub async fn create_collection(
        &self,
        input: CreateCollectionInput,
    ) -> Result<Sourced<Collection>, StoreError> {
        let input = CreateCollectionInput {
            name: valid_name(&input.name)?,
            ..input
        };
        if let Some(durable) = self.selector.durable() {
            match durable.insert(input.clone()).await {
                Ok(record) => return Ok(Sourced::durable(record)),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(error = %e, "durable create failed, retrying against memory");
                }
                Err(e) => return Err(e),
            }
        }
        self.memory.insert(input).await.map(Sourced::memory)
    }

    pub async fn get_collection(&self, name: &str) -> Result<Sourced<Collection>, StoreError> {
        let name = valid_name(name)?;
        if let Some(durable) = self.selector.durable() {
            match durable.find_by_name(&name).await {
                Ok(record) => return Ok(Sourced::durable(record)),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(error = %e, "durable lookup failed, retrying against memory");
                }
                Err(e) => return Err(e),
            }
        }
        self.memory.find_by_name(&name).await.map(Sourced::memory)
    }

    pub async fn list_collections(&self) -> Result<Sourced<Vec<Collection>>, StoreError> {
        if let Some(durable) = self.selector.durable() {
            match durable.find_all().await {
                Ok(records) => return Ok(Sourced::durable(records)),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(error = %e, "durable list failed, retrying against memory");
                }
                Err(e) => return Err(e),
            }
        }
        self.memory.find_all().await.map(Sourced::memory)
    }

    pub async fn rename_collection(
        &self,
        name: &str,
        new_name: &str,
    ) -> Result<Sourced<Collection>, StoreError> {
        let name = valid_name(name)?;
        let new_name = valid_name(new_name)?;
        if let Some(durable) = self.selector.durable() {
            match durable.rename(&name, &new_name).await {
                Ok(record) => return Ok(Sourced::durable(record)),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(error = %e, "durable rename failed, retrying against memory");
                }
                Err(e) => return Err(e),
            }
        }
        self.memory
            .rename(&name, &new_name)
            .await
            .map(Sourced::memory)
    }

    pub async fn delete_collection(&self, name: &str) -> Result<Sourced<()>, StoreError> {
        let name = valid_name(name)?;
        if let Some(durable) = self.selector.durable() {
            match durable.remove(&name).await {
                Ok(()) => return Ok(Sourced::durable(())),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(error = %e, "durable delete failed, retrying against memory");
                }
                Err(e) => return Err(e),
            }
        }
        self.memory.remove(&name).await.map(Sourced::memory)
    }

    pub async fn add_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<Sourced<QuoteRef>, StoreError> {
        let name = valid_name(name)?;
        let text = valid_quote_field(text, "text")?;
        let author = valid_quote_field(author, "author")?;
        if let Some(durable) = self.selector.durable() {
            match durable.add_quote(&name, &text, &author).await {
                Ok(record) => return Ok(Sourced::durable(record)),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(error = %e, "durable quote add failed, retrying against memory");
                }
                Err(e) => return Err(e),
            }
        }
        self.memory
            .add_quote(&name, &text, &author)
            .await
            .map(Sourced::memory)
    }

    pub async fn remove_quote(
        &self,
        name: &str,
        text: &str,
        author: &str,
    ) -> Result<Sourced<QuoteRef>, StoreError> {
        let name = valid_name(name)?;
        let text = valid_quote_field(text, "text")?;
        let author = valid_quote_field(author, "author")?;
        if let Some(durable) = self.selector.durable() {
            match durable.remove_quote(&name, &text, &author).await {
                Ok(record) => return Ok(Sourced::durable(record)),
                Err(e) if e.triggers_fallback() => {
                    tracing::warn!(
                        error = %e,
                        "durable quote removal failed, retrying against memory"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        self.memory
            .remove_quote(&name, &text, &author)
            .await
            .map(Sourced::memory)
    }
}
