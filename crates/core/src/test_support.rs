// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    DepRecord, JobId, JobListEntry, LineageRecord, LoadedParams, MethodParams, ParamsRecord,
    Timestamp,
};
use serde_json::Value;
use std::collections::BTreeMap;

// ── Lineage factory functions ───────────────────────────────────────────────

/// Parse a timestamp known to be valid.
#[allow(clippy::panic)]
pub fn ts(s: &str) -> Timestamp {
    match Timestamp::parse(s) {
        Ok(ts) => ts,
        Err(e) => panic!("test timestamp {s:?} is invalid: {e}"),
    }
}

pub fn joblist(steps: &[(&str, &str)]) -> Vec<JobListEntry> {
    steps.iter().map(|(name, job)| JobListEntry::new(*name, *job)).collect()
}

/// Record for `user/automation` at `timestamp` with a single joblist step.
pub fn lineage_record(user: &str, automation: &str, timestamp: &str) -> LineageRecord {
    LineageRecord {
        timestamp: ts(timestamp),
        joblist: joblist(&[("csvimport", "dev-1")]),
        caption: String::new(),
        user: user.to_string(),
        automation: automation.to_string(),
        deps: BTreeMap::new(),
    }
}

pub fn dep_record(timestamp: &str, steps: &[(&str, &str)], caption: &str) -> DepRecord {
    DepRecord { timestamp: ts(timestamp), joblist: joblist(steps), caption: caption.to_string() }
}

// ── Job parameter factory functions ─────────────────────────────────────────

/// Options-only method parameters.
pub fn options(pairs: &[(&str, Value)]) -> MethodParams {
    MethodParams {
        options: pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ..MethodParams::default()
    }
}

/// Parameter record whose params hold only the job's own method.
pub fn params_record(id: &str, method: &str, hash: &str, starttime: f64) -> ParamsRecord {
    let mut params = BTreeMap::new();
    params.insert(method.to_string(), MethodParams::default());
    ParamsRecord::builder()
        .jobid(id)
        .method(method)
        .hash(hash)
        .starttime(starttime)
        .params(params)
        .build()
}

/// Loaded parameters with the given subjobs.
pub fn loaded(record: ParamsRecord, subjobs: &[&str]) -> LoadedParams {
    LoadedParams { record, subjobs: subjobs.iter().map(|s| JobId::new(*s)).collect() }
}
