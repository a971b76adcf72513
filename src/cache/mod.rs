//! Translation cache and in-flight request registry.
//!
//! Both tables live behind one mutex: the cooperative single-threaded model
//! of the original design becomes an explicit lock here, so a lookup, a
//! pending-claim, and a settle are each one atomic step.

pub mod store;

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

use crate::config::{ProviderId, Scope};
use crate::providers::ProviderError;

/// Identity of one translation request. Identical tuples always map to the
/// same cache entry, regardless of call order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub provider: ProviderId,
    pub source_lang: String,
    pub target_lang: String,
    pub text: String,
}

impl TranslationKey {
    pub fn new(scope: &Scope, text: &str) -> Self {
        Self {
            provider: scope.provider,
            source_lang: scope.source_lang.clone(),
            target_lang: scope.target_lang.clone(),
            text: text.to_string(),
        }
    }
}

/// Shared settle cell for one in-flight provider call.
///
/// Every caller that asks for a key while a call is in flight holds a clone
/// of the same cell; the owning worker fills it exactly once and wakes
/// everyone, so concurrent identical requests cost one network call.
pub struct PendingCell {
    outcome: Mutex<Option<Result<String, ProviderError>>>,
    settled: Condvar,
}

impl PendingCell {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            settled: Condvar::new(),
        }
    }

    /// Block until the owning call settles, then return its outcome.
    pub fn wait(&self) -> Result<String, ProviderError> {
        let mut outcome = self.outcome.lock().unwrap();
        while outcome.is_none() {
            outcome = self.settled.wait(outcome).unwrap();
        }
        outcome.clone().unwrap()
    }

    /// Fill the cell and wake all waiters. Only the first fill sticks.
    pub fn settle(&self, result: Result<String, ProviderError>) {
        let mut outcome = self.outcome.lock().unwrap();
        if outcome.is_none() {
            *outcome = Some(result);
        }
        self.settled.notify_all();
    }
}

pub enum Lookup {
    /// Completed translation straight from the cache.
    Hit(String),
    /// Someone else's call is in flight; wait on the shared cell.
    InFlight(Arc<PendingCell>),
    /// The caller claimed the key and must invoke the provider and settle.
    Miss(Arc<PendingCell>),
}

#[derive(Default)]
struct CacheTables {
    entries: HashMap<TranslationKey, String>,
    pending: HashMap<TranslationKey, Arc<PendingCell>>,
    /// Set when a network result lands, cleared by the write-back flush.
    dirty: bool,
}

/// In-memory translation cache plus the in-flight request registry.
#[derive(Default)]
pub struct TranslationCache {
    tables: Mutex<CacheTables>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TranslationKey) -> Option<String> {
        self.tables.lock().unwrap().entries.get(key).cloned()
    }

    /// One atomic step: cache hit, join an in-flight call, or claim a miss.
    pub fn lookup_or_claim(&self, key: &TranslationKey) -> Lookup {
        let mut tables = self.tables.lock().unwrap();
        if let Some(hit) = tables.entries.get(key) {
            return Lookup::Hit(hit.clone());
        }
        if let Some(cell) = tables.pending.get(key) {
            return Lookup::InFlight(cell.clone());
        }
        let cell = Arc::new(PendingCell::new());
        tables.pending.insert(key.clone(), cell.clone());
        Lookup::Miss(cell)
    }

    /// Record a settled call: the pending slot is dropped unconditionally,
    /// successes are kept (first value written for a key wins), failures are
    /// never stored.
    pub fn settle(&self, key: &TranslationKey, result: &Result<String, ProviderError>) {
        let mut tables = self.tables.lock().unwrap();
        tables.pending.remove(key);
        if let Ok(value) = result {
            tables
                .entries
                .entry(key.clone())
                .or_insert_with(|| value.clone());
            tables.dirty = true;
        }
    }

    /// Seed entries loaded from durable storage. Results that already landed
    /// keep priority, and the seed does not mark the cache dirty.
    pub fn populate(&self, scope: &Scope, entries: Vec<(String, String)>) {
        let mut tables = self.tables.lock().unwrap();
        for (text, value) in entries {
            tables
                .entries
                .entry(TranslationKey::new(scope, &text))
                .or_insert(value);
        }
    }

    /// Drop everything; the scope the entries were cached under is gone.
    pub fn clear(&self) {
        let mut tables = self.tables.lock().unwrap();
        tables.entries.clear();
        tables.pending.clear();
        tables.dirty = false;
    }

    /// Entries belonging to one scope, for the write-back flush.
    pub fn scope_snapshot(&self, scope: &Scope) -> Vec<(String, String)> {
        let tables = self.tables.lock().unwrap();
        tables
            .entries
            .iter()
            .filter(|(k, _)| {
                k.provider == scope.provider
                    && k.source_lang == scope.source_lang
                    && k.target_lang == scope.target_lang
            })
            .map(|(k, v)| (k.text.clone(), v.clone()))
            .collect()
    }

    /// Check-and-clear the dirty flag. Returns whether a flush is due.
    pub fn take_dirty(&self) -> bool {
        let mut tables = self.tables.lock().unwrap();
        std::mem::take(&mut tables.dirty)
    }

    pub fn len(&self) -> usize {
        self.tables.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
