// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flattened option sets used for approximate cache matching.

use crate::job::MethodParams;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Set of flattened `key=value` strings.
///
/// Entries produced by [`Optset::from_params`] look like
/// `method:section:key=value`, values rendered as compact JSON. Nested
/// objects are flattened with dotted keys (`key.sub=value`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Optset(BTreeSet<String>);

impl Optset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten the parameters of every method into one set.
    pub fn from_params(params: &BTreeMap<String, MethodParams>) -> Self {
        let mut set = BTreeSet::new();
        for (method, p) in params {
            for (section, values) in p.sections() {
                for (key, value) in values {
                    flatten(&format!("{method}:{section}:{key}"), value, &mut set);
                }
            }
        }
        Self(set)
    }

    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        self.0.insert(entry.into())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.contains(entry)
    }

    /// True when every entry of `self` is also in `other`.
    pub fn is_subset(&self, other: &Optset) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                flatten(&format!("{prefix}.{k}"), v, out);
            }
        }
        other => {
            out.insert(format!("{prefix}={other}"));
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Optset {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[path = "optset_tests.rs"]
mod tests;
