//! Backend selection: should an operation try the durable repository?

use std::env;
use std::sync::Arc;

use crate::domain::CollectionRepository;

/// Environment flag that pins the store to the memory table. Read on every
/// call so a change takes effect without a restart.
const MEMORY_ONLY_VAR: &str = "COLLECTIONS_MEMORY_ONLY";

pub fn memory_only_requested() -> bool {
    env::var(MEMORY_ONLY_VAR)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Decides, per operation, whether the durable backend should be tried.
/// Holds the durable repository when one was constructed at startup; the
/// memory-only flag is reevaluated on every call, never cached.
pub struct BackendSelector {
    durable: Option<Arc<dyn CollectionRepository>>,
}

impl BackendSelector {
    pub fn new(durable: Option<Arc<dyn CollectionRepository>>) -> Self {
        Self { durable }
    }

    pub fn is_durable_enabled(&self) -> bool {
        self.durable.is_some() && !memory_only_requested()
    }

    /// The durable repository, or None when durable storage is disabled
    /// outright. Never errors; failures of the repository itself are the
    /// caller's to classify.
    pub fn durable(&self) -> Option<&dyn CollectionRepository> {
        if memory_only_requested() {
            return None;
        }
        self.durable.as_deref()
    }
}
