// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborators that read jobs off disk: the workdir enumerator and the
//! parameter loader, plus filesystem implementations of both.

use ax_core::{JobId, LoadedParams, ParamsRecord};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Parameter record written when a job is set up
pub const SETUP_FILE: &str = "setup.json";

/// Post-run record listing the subjobs a job created
pub const POST_FILE: &str = "post.json";

/// Why a job's parameters could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {id} is malformed: {reason}")]
    Malformed { id: JobId, reason: String },

    #[error("failed to read job {id}: {source}")]
    Io {
        id: JobId,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    pub fn job_id(&self) -> &JobId {
        match self {
            LoadError::NotFound(id) => id,
            LoadError::Malformed { id, .. } | LoadError::Io { id, .. } => id,
        }
    }

    /// Missing and malformed jobs are excluded from the index; anything
    /// else means the loader itself is broken.
    pub fn is_exclusion(&self) -> bool {
        matches!(self, LoadError::NotFound(_) | LoadError::Malformed { .. })
    }
}

/// Loads a job's persisted parameter record and its declared subjobs.
pub trait ParamsLoader: Send + Sync {
    fn load(&self, id: &JobId) -> Result<LoadedParams, LoadError>;
}

/// A physical location holding job directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    pub name: String,
    pub path: PathBuf,
    /// Parallelism used when loading this workdir's jobs
    pub slices: usize,
}

impl Workdir {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, slices: usize) -> Self {
        Self { name: name.into(), path: path.into(), slices }
    }
}

/// Lists the job identifiers physically present in a workdir.
pub trait WorkdirEnumerator: Send + Sync {
    fn list_job_ids(&self, workdir: &Workdir) -> io::Result<HashSet<JobId>>;
}

/// Enumerates job directories named `{workdir}-{N}` that hold a setup file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWorkdirs;

impl WorkdirEnumerator for FsWorkdirs {
    fn list_job_ids(&self, workdir: &Workdir) -> io::Result<HashSet<JobId>> {
        let mut ids = HashSet::new();
        for entry in std::fs::read_dir(&workdir.path)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(JobId::new) else {
                continue;
            };
            if name.workdir() != Some(workdir.name.as_str()) {
                continue;
            }
            if entry.path().join(SETUP_FILE).is_file() {
                ids.insert(name);
            }
        }
        Ok(ids)
    }
}

/// Reads `setup.json` and `post.json` from a job's directory.
///
/// The workdir holding a job is found through the prefix of its identifier.
#[derive(Debug, Clone, Default)]
pub struct FsParamsLoader {
    roots: HashMap<String, PathBuf>,
}

impl FsParamsLoader {
    pub fn new<'a>(workdirs: impl IntoIterator<Item = &'a Workdir>) -> Self {
        let roots = workdirs.into_iter().map(|w| (w.name.clone(), w.path.clone())).collect();
        Self { roots }
    }

    /// Directory of a job, if its workdir is known.
    pub fn job_dir(&self, id: &JobId) -> Option<PathBuf> {
        let root = self.roots.get(id.workdir()?)?;
        Some(root.join(id.as_str()))
    }
}

/// Subjobs are stored either as a list or as an object keyed by job id.
#[derive(Deserialize)]
#[serde(untagged)]
enum Subjobs {
    List(Vec<JobId>),
    Keyed(BTreeMap<JobId, serde_json::Value>),
}

#[derive(Deserialize)]
struct PostRecord {
    #[serde(default)]
    subjobs: Option<Subjobs>,
}

fn read_json<T: serde::de::DeserializeOwned>(id: &JobId, path: &Path) -> Result<T, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(id.clone()),
        _ => LoadError::Io { id: id.clone(), source },
    })?;
    serde_json::from_slice(&bytes).map_err(|e| LoadError::Malformed {
        id: id.clone(),
        reason: format!("{}: {e}", path.display()),
    })
}

impl ParamsLoader for FsParamsLoader {
    fn load(&self, id: &JobId) -> Result<LoadedParams, LoadError> {
        let dir = self.job_dir(id).ok_or_else(|| LoadError::NotFound(id.clone()))?;

        let record: ParamsRecord = read_json(id, &dir.join(SETUP_FILE))?;
        if record.jobid != *id {
            return Err(LoadError::Malformed {
                id: id.clone(),
                reason: format!("setup names job {}", record.jobid),
            });
        }

        let post: PostRecord = read_json(id, &dir.join(POST_FILE))?;
        let subjobs = match post.subjobs {
            None => Vec::new(),
            Some(Subjobs::List(ids)) => ids,
            Some(Subjobs::Keyed(map)) => map.into_keys().collect(),
        };

        Ok(LoadedParams { record, subjobs })
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{LoadError, ParamsLoader, Workdir, WorkdirEnumerator};
    use ax_core::{JobId, LoadedParams};
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeLoaderState {
        records: HashMap<JobId, LoadedParams>,
        malformed: HashSet<JobId>,
        broken: HashSet<JobId>,
        calls: Vec<JobId>,
    }

    /// In-memory loader recording every call.
    #[derive(Clone, Default)]
    pub struct FakeParamsLoader {
        inner: Arc<Mutex<FakeLoaderState>>,
    }

    impl FakeParamsLoader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&self, loaded: LoadedParams) {
            self.inner.lock().records.insert(loaded.record.jobid.clone(), loaded);
        }

        pub fn remove(&self, id: &str) {
            self.inner.lock().records.remove(id);
        }

        /// Make loads of `id` fail as malformed.
        pub fn mark_malformed(&self, id: &str) {
            self.inner.lock().malformed.insert(JobId::new(id));
        }

        /// Make loads of `id` fail with an I/O error.
        pub fn mark_broken(&self, id: &str) {
            self.inner.lock().broken.insert(JobId::new(id));
        }

        pub fn calls(&self) -> Vec<JobId> {
            self.inner.lock().calls.clone()
        }

        pub fn load_count(&self, id: &str) -> usize {
            self.inner.lock().calls.iter().filter(|c| *c == id).count()
        }
    }

    impl ParamsLoader for FakeParamsLoader {
        fn load(&self, id: &JobId) -> Result<LoadedParams, LoadError> {
            let mut state = self.inner.lock();
            state.calls.push(id.clone());
            if state.broken.contains(id) {
                return Err(LoadError::Io {
                    id: id.clone(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "fake"),
                });
            }
            if state.malformed.contains(id) {
                return Err(LoadError::Malformed { id: id.clone(), reason: "fake".into() });
            }
            state.records.get(id).cloned().ok_or_else(|| LoadError::NotFound(id.clone()))
        }
    }

    /// In-memory workdir listing.
    #[derive(Clone, Default)]
    pub struct FakeWorkdirs {
        inner: Arc<Mutex<HashMap<String, HashSet<JobId>>>>,
    }

    impl FakeWorkdirs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add(&self, workdir: &str, id: &str) {
            self.inner.lock().entry(workdir.to_string()).or_default().insert(JobId::new(id));
        }

        pub fn remove(&self, workdir: &str, id: &str) {
            if let Some(ids) = self.inner.lock().get_mut(workdir) {
                ids.remove(id);
            }
        }
    }

    impl WorkdirEnumerator for FakeWorkdirs {
        fn list_job_ids(&self, workdir: &Workdir) -> io::Result<HashSet<JobId>> {
            Ok(self.inner.lock().get(&workdir.name).cloned().unwrap_or_default())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeParamsLoader, FakeWorkdirs};

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
