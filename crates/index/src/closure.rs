// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ax_core::JobId;
use std::collections::HashMap;

/// Remove every candidate that references a subjob which is not itself a
/// candidate, repeating until nothing changes.
///
/// `candidates` maps each job to its declared subjobs. On return every
/// remaining job's subjobs are all remaining jobs. The removed ids are
/// returned in removal order; ids removed in the same pass are sorted.
pub fn subjob_closure(candidates: &mut HashMap<JobId, Vec<JobId>>) -> Vec<JobId> {
    let mut discarded = Vec::new();
    loop {
        let mut doomed: Vec<JobId> = candidates
            .iter()
            .filter(|(_, subjobs)| subjobs.iter().any(|s| !candidates.contains_key(s)))
            .map(|(id, _)| id.clone())
            .collect();
        if doomed.is_empty() {
            return discarded;
        }
        doomed.sort();
        for id in &doomed {
            candidates.remove(id);
        }
        discarded.extend(doomed);
    }
}

#[cfg(test)]
#[path = "closure_tests.rs"]
mod tests;
