// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memoized parameter records, keyed by job id.

use crate::loader::{LoadError, ParamsLoader};
use ax_core::{JobId, LoadedParams};
use parking_lot::RwLock;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Get-or-load cache in front of a [`ParamsLoader`].
///
/// Only successful loads are memoized. A failed job is retried the next
/// time it is asked for.
pub struct ParamsCache<L> {
    loader: L,
    entries: RwLock<HashMap<JobId, Arc<LoadedParams>>>,
}

impl<L: ParamsLoader> ParamsCache<L> {
    pub fn new(loader: L) -> Self {
        Self { loader, entries: RwLock::new(HashMap::new()) }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Return the memoized entry for `id`, loading it on first access.
    ///
    /// The loader runs without holding the lock, so first accesses for
    /// distinct ids proceed in parallel.
    pub fn get(&self, id: &JobId) -> Result<Arc<LoadedParams>, LoadError> {
        if let Some(hit) = self.entries.read().get(id) {
            return Ok(Arc::clone(hit));
        }
        let loaded = Arc::new(self.loader.load(id)?);
        let mut entries = self.entries.write();
        let entry = entries.entry(id.clone()).or_insert(loaded);
        Ok(Arc::clone(entry))
    }

    /// Memoized entry, without loading.
    pub fn peek(&self, id: &JobId) -> Option<Arc<LoadedParams>> {
        self.entries.read().get(id).cloned()
    }

    /// Load every id on `pool`, in no particular order. Returns the failures.
    pub fn populate(&self, ids: &[JobId], pool: &ThreadPool) -> Vec<LoadError> {
        pool.install(|| ids.par_iter().filter_map(|id| self.get(id).err()).collect())
    }

    pub fn evict(&self, id: &JobId) -> bool {
        self.entries.write().remove(id).is_some()
    }

    /// Drop every entry not in `keep`. Returns the evicted ids, sorted.
    pub fn retain(&self, keep: &HashSet<JobId>) -> Vec<JobId> {
        let mut entries = self.entries.write();
        let mut evicted: Vec<JobId> =
            entries.keys().filter(|id| !keep.contains(*id)).cloned().collect();
        for id in &evicted {
            entries.remove(id);
        }
        evicted.sort();
        evicted
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.entries.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current entries, in no particular order.
    pub fn snapshot(&self) -> Vec<(JobId, Arc<LoadedParams>)> {
        self.entries.read().iter().map(|(id, e)| (id.clone(), Arc::clone(e))).collect()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
