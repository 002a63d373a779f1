// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job index: rebuild protocol and match queries.

use crate::cache::ParamsCache;
use crate::closure::subjob_closure;
use crate::hashes::MethodHashSet;
use crate::loader::{LoadError, ParamsLoader, Workdir, WorkdirEnumerator};
use ax_core::{Job, JobId, MethodParams, Optset};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from rebuilding or extending the index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no scan in progress: call begin() first")]
    NoScanInProgress,

    #[error("failed to list workdir {workdir}: {source}")]
    Enumerate {
        workdir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build loader pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// One lookup: which method, the caller's request id, and the wanted options.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest<R> {
    pub method: String,
    pub id: R,
    pub optset: Optset,
}

impl<R> MatchRequest<R> {
    pub fn new(method: impl Into<String>, id: R, optset: Optset) -> Self {
        Self { method: method.into(), id, optset }
    }
}

/// What the last rebuild kept and threw away.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RebuildReport {
    /// Job ids found across all observed workdirs
    pub observed: usize,
    /// Cache entries dropped because their job is gone from disk
    pub evicted: Vec<JobId>,
    /// Jobs that could not be loaded, with the reason
    pub load_failures: Vec<(JobId, String)>,
    /// Jobs whose hash is not valid for their method
    pub discarded_hash: Vec<JobId>,
    /// Jobs with a subjob that is not itself admitted
    pub discarded_subjobs: Vec<JobId>,
    /// Jobs in the index after the rebuild
    pub admitted: usize,
}

#[derive(Default)]
struct Scan {
    observed: HashSet<JobId>,
    load_failures: Vec<(JobId, String)>,
}

/// Method-indexed, newest-first list of cache-eligible jobs.
///
/// Rebuilt with `begin`, one `observe` per workdir, then `finish`. The
/// rebuild takes `&mut self`, so queries never see a half-built index;
/// until `finish` swaps in the new lists, queries answer from the old ones.
pub struct JobIndex<L, E> {
    cache: ParamsCache<L>,
    enumerator: E,
    scan: Option<Scan>,
    by_method: HashMap<String, Vec<Job>>,
    defaults: HashMap<String, MethodParams>,
    report: Option<RebuildReport>,
}

impl<L: ParamsLoader, E: WorkdirEnumerator> JobIndex<L, E> {
    pub fn new(loader: L, enumerator: E) -> Self {
        Self {
            cache: ParamsCache::new(loader),
            enumerator,
            scan: None,
            by_method: HashMap::new(),
            defaults: HashMap::new(),
            report: None,
        }
    }

    pub fn cache(&self) -> &ParamsCache<L> {
        &self.cache
    }

    /// Start a rescan with an empty observed set.
    pub fn begin(&mut self) {
        self.scan = Some(Scan::default());
    }

    /// Record the jobs present in `workdir`, loading any the cache lacks.
    ///
    /// Loads run on a pool of `workdir.slices` threads. Missing or malformed
    /// jobs are logged and left out; an I/O failure aborts the call.
    /// Returns the number of job ids found in the workdir.
    pub fn observe(&mut self, workdir: &Workdir) -> Result<usize, IndexError> {
        let scan = self.scan.as_mut().ok_or(IndexError::NoScanInProgress)?;
        let found = self.enumerator.list_job_ids(workdir).map_err(|source| {
            IndexError::Enumerate { workdir: workdir.name.clone(), source }
        })?;

        let fresh: Vec<JobId> = found.iter().filter(|id| !self.cache.contains(id)).cloned().collect();
        scan.observed.extend(found.iter().cloned());

        if !fresh.is_empty() {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workdir.slices.max(1))
                .thread_name(|i| format!("ax-load-{i}"))
                .build()?;
            let mut fatal = None;
            for err in self.cache.populate(&fresh, &pool) {
                if err.is_exclusion() {
                    warn!(job_id = %err.job_id(), error = %err, "excluding job");
                    scan.load_failures.push((err.job_id().clone(), err.to_string()));
                } else if fatal.is_none() {
                    fatal = Some(err);
                }
            }
            if let Some(err) = fatal {
                return Err(IndexError::Load(err));
            }
        }

        info!(
            workdir = %workdir.name,
            found = found.len(),
            loaded = fresh.len(),
            "observed workdir"
        );
        Ok(found.len())
    }

    /// Finish the rescan: evict vanished jobs, filter on valid hashes and
    /// subjob closure, and swap in the new newest-first lists. Jobs with
    /// the same start time are ordered by id.
    pub fn finish(&mut self, hashes: &MethodHashSet) -> Result<RebuildReport, IndexError> {
        let Scan { observed, mut load_failures } =
            self.scan.take().ok_or(IndexError::NoScanInProgress)?;

        let evicted = self.cache.retain(&observed);

        let mut discarded_hash = Vec::new();
        let mut candidates = HashMap::new();
        for (id, entry) in self.cache.snapshot() {
            if hashes.is_valid(&entry.record.method, &entry.record.hash) {
                candidates.insert(id, entry);
            } else {
                discarded_hash.push(id);
            }
        }
        discarded_hash.sort();

        let mut graph: HashMap<JobId, Vec<JobId>> =
            candidates.iter().map(|(id, e)| (id.clone(), e.subjobs.clone())).collect();
        let discarded_subjobs = subjob_closure(&mut graph);

        let mut by_method: HashMap<String, Vec<Job>> = HashMap::new();
        for (id, entry) in candidates {
            if graph.contains_key(&id) {
                let job = Job::from_record(&entry.record, hashes.defaults());
                by_method.entry(job.method.clone()).or_default().push(job);
            }
        }
        for jobs in by_method.values_mut() {
            jobs.sort_by(|a, b| b.time.total_cmp(&a.time).then_with(|| a.id.cmp(&b.id)));
        }

        if !discarded_hash.is_empty() {
            debug!(jobs = ?discarded_hash, "discarded due to unknown hash");
        }
        if !discarded_subjobs.is_empty() {
            debug!(jobs = ?discarded_subjobs, "discarded due to invalid subjobs");
        }

        load_failures.sort_by(|a, b| a.0.cmp(&b.0));
        let report = RebuildReport {
            observed: observed.len(),
            evicted,
            load_failures,
            discarded_hash,
            discarded_subjobs,
            admitted: graph.len(),
        };
        info!(admitted = report.admitted, observed = report.observed, "job index rebuilt");

        self.by_method = by_method;
        self.defaults = hashes.defaults().clone();
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Load one job and put it at the front of its method's list, skipping
    /// the hash and subjob checks. For jobs that just finished running.
    pub fn add_single(&mut self, id: &JobId) -> Result<Job, IndexError> {
        let entry = self.cache.get(id)?;
        let job = Job::from_record(&entry.record, &self.defaults);
        debug!(job_id = %id, method = %job.method, "added job");
        self.by_method.entry(job.method.clone()).or_default().insert(0, job.clone());
        Ok(job)
    }

    /// For each request, the newest job of its method whose optset equals
    /// the requested one. Requests without a match yield nothing.
    pub fn match_exact<'a, R: 'a>(
        &'a self,
        requests: impl IntoIterator<Item = MatchRequest<R>> + 'a,
    ) -> impl Iterator<Item = (R, &'a Job)> + 'a {
        self.matching(requests, |wanted, job| wanted == job)
    }

    /// Like [`match_exact`](Self::match_exact), but a job matches when its
    /// optset contains every requested entry.
    pub fn match_complex<'a, R: 'a>(
        &'a self,
        requests: impl IntoIterator<Item = MatchRequest<R>> + 'a,
    ) -> impl Iterator<Item = (R, &'a Job)> + 'a {
        self.matching(requests, |wanted, job| wanted.is_subset(job))
    }

    fn matching<'a, R: 'a>(
        &'a self,
        requests: impl IntoIterator<Item = MatchRequest<R>> + 'a,
        accept: fn(&Optset, &Optset) -> bool,
    ) -> impl Iterator<Item = (R, &'a Job)> + 'a {
        requests.into_iter().filter_map(move |req| {
            let jobs = self.by_method.get(&req.method)?;
            let job = jobs.iter().find(|job| accept(&req.optset, &job.optset))?;
            Some((req.id, job))
        })
    }

    pub fn last_report(&self) -> Option<&RebuildReport> {
        self.report.as_ref()
    }

    /// Number of admitted jobs across all methods.
    pub fn len(&self) -> usize {
        self.by_method.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.values().all(Vec::is_empty)
    }

    /// Admitted jobs of `method`, newest first.
    pub fn jobs_for(&self, method: &str) -> &[Job] {
        self.by_method.get(method).map(Vec::as_slice).unwrap_or_default()
    }

    /// Methods with at least one admitted job, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self
            .by_method
            .iter()
            .filter(|(_, jobs)| !jobs.is_empty())
            .map(|(m, _)| m.as_str())
            .collect();
        methods.sort_unstable();
        methods
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
