// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifiers, persisted parameter records, and cache-eligible jobs.

use crate::optset::Optset;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

crate::define_id! {
    /// Identifier of a completed job.
    ///
    /// Job directories are named `{workdir}-{N}`, so the identifier also
    /// tells which workdir holds the job.
    pub struct JobId;
}

impl JobId {
    /// Workdir name encoded in the identifier (`dev` for `dev-42`).
    pub fn workdir(&self) -> Option<&str> {
        let (name, number) = self.as_str().rsplit_once('-')?;
        let numeric = !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit());
        (numeric && !name.is_empty()).then_some(name)
    }

    /// Sequence number within the workdir (`42` for `dev-42`).
    pub fn number(&self) -> Option<u64> {
        self.workdir()?;
        self.as_str().rsplit_once('-').and_then(|(_, n)| n.parse().ok())
    }
}

/// Parameters of one method, split into the three sections a method declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodParams {
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
    #[serde(default)]
    pub datasets: BTreeMap<String, Value>,
    #[serde(default)]
    pub jobs: BTreeMap<String, Value>,
}

impl MethodParams {
    /// Section name paired with its contents, in a fixed order.
    pub fn sections(&self) -> [(&'static str, &BTreeMap<String, Value>); 3] {
        [("options", &self.options), ("datasets", &self.datasets), ("jobs", &self.jobs)]
    }

    /// Overlay `self` onto `defaults`: every value set here wins, every
    /// default not mentioned here is kept.
    pub fn over(&self, defaults: &MethodParams) -> MethodParams {
        let merge = |base: &BTreeMap<String, Value>, top: &BTreeMap<String, Value>| {
            let mut merged = base.clone();
            merged.extend(top.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
        };
        MethodParams {
            options: merge(&defaults.options, &self.options),
            datasets: merge(&defaults.datasets, &self.datasets),
            jobs: merge(&defaults.jobs, &self.jobs),
        }
    }
}

/// Execution timing written back into the parameter record when a job ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecTime {
    #[serde(default)]
    pub total: f64,
}

/// Persisted parameter record of a job (`setup.json`).
///
/// `params` holds one entry for the job's own method and one for every
/// method reached through its subjobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsRecord {
    pub jobid: JobId,
    pub method: String,
    pub hash: String,
    /// Start time, seconds since the epoch
    pub starttime: f64,
    #[serde(default)]
    pub exectime: ExecTime,
    #[serde(default)]
    pub params: BTreeMap<String, MethodParams>,
}

/// Parameter record with test defaults; every field can be overridden.
#[cfg(any(test, feature = "test-support"))]
pub struct ParamsRecordBuilder {
    record: ParamsRecord,
}

#[cfg(any(test, feature = "test-support"))]
impl ParamsRecordBuilder {
    pub fn jobid(mut self, id: impl Into<JobId>) -> Self {
        self.record.jobid = id.into();
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.record.method = method.into();
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.record.hash = hash.into();
        self
    }

    pub fn starttime(mut self, starttime: f64) -> Self {
        self.record.starttime = starttime;
        self
    }

    pub fn exectime(mut self, exectime: ExecTime) -> Self {
        self.record.exectime = exectime;
        self
    }

    pub fn params(mut self, params: BTreeMap<String, MethodParams>) -> Self {
        self.record.params = params;
        self
    }

    pub fn build(self) -> ParamsRecord {
        self.record
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ParamsRecord {
    /// A `csvimport` record `test-0` with hash `hash-0` and no params.
    pub fn builder() -> ParamsRecordBuilder {
        ParamsRecordBuilder {
            record: ParamsRecord {
                jobid: JobId::new("test-0"),
                method: "csvimport".to_string(),
                hash: "hash-0".to_string(),
                starttime: 1_700_000_000.0,
                exectime: ExecTime { total: 1.0 },
                params: BTreeMap::new(),
            },
        }
    }
}

/// What loading a job yields: its parameter record and declared subjobs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedParams {
    pub record: ParamsRecord,
    pub subjobs: Vec<JobId>,
}

/// A completed, hash-identified computation admitted to the job index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub method: String,
    /// The job's own method parameters, defaults resolved
    pub params: MethodParams,
    /// Flattened options of the job and every subjob method
    pub optset: Optset,
    pub hash: String,
    /// Start time, seconds since the epoch
    pub time: f64,
    /// Execution duration in seconds
    pub total: f64,
}

impl Job {
    /// Build a job from its parameter record.
    ///
    /// Each method's parameters are laid over that method's defaults before
    /// the optset is computed, so a job that ran before an option existed
    /// still carries the option at its default value.
    pub fn from_record(record: &ParamsRecord, defaults: &HashMap<String, MethodParams>) -> Self {
        let resolved: BTreeMap<String, MethodParams> = record
            .params
            .iter()
            .map(|(method, params)| {
                let params = match defaults.get(method) {
                    Some(d) => params.over(d),
                    None => params.clone(),
                };
                (method.clone(), params)
            })
            .collect();
        let own = match resolved.get(&record.method) {
            Some(p) => p.clone(),
            None => defaults.get(&record.method).cloned().unwrap_or_default(),
        };
        Job {
            id: record.jobid.clone(),
            method: record.method.clone(),
            params: own,
            optset: Optset::from_params(&resolved),
            hash: record.hash.clone(),
            time: record.starttime,
            total: record.exectime.total,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
