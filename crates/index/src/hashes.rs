// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Currently-valid content hashes and parameter defaults per method.

use ax_core::MethodParams;
use std::collections::{HashMap, HashSet};

/// Per-method set of valid hashes, supplied once per index rebuild.
///
/// A job is cache-eligible only if its hash is in its method's set. The
/// set also carries each method's parameter defaults, which are laid under
/// a job's recorded parameters when the job is admitted.
#[derive(Debug, Clone, Default)]
pub struct MethodHashSet {
    hashes: HashMap<String, HashSet<String>>,
    defaults: HashMap<String, MethodParams>,
}

impl MethodHashSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a valid hash for `method`.
    pub fn with_hash(mut self, method: impl Into<String>, hash: impl Into<String>) -> Self {
        self.insert(method, hash);
        self
    }

    /// Set the parameter defaults of `method`.
    pub fn with_defaults(mut self, method: impl Into<String>, defaults: MethodParams) -> Self {
        self.defaults.insert(method.into(), defaults);
        self
    }

    pub fn insert(&mut self, method: impl Into<String>, hash: impl Into<String>) {
        self.hashes.entry(method.into()).or_default().insert(hash.into());
    }

    pub fn valid_hashes(&self, method: &str) -> Option<&HashSet<String>> {
        self.hashes.get(method)
    }

    pub fn is_valid(&self, method: &str, hash: &str) -> bool {
        self.hashes.get(method).is_some_and(|set| set.contains(hash))
    }

    pub fn defaults(&self) -> &HashMap<String, MethodParams> {
        &self.defaults
    }
}

impl<M: Into<String>, H: Into<String>> FromIterator<(M, H)> for MethodHashSet {
    fn from_iter<I: IntoIterator<Item = (M, H)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (method, hash) in iter {
            set.insert(method, hash);
        }
        set
    }
}

#[cfg(test)]
#[path = "hashes_tests.rs"]
mod tests;
