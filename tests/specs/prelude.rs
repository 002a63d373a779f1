// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the specs.

pub use ax_core::{JobId, MethodParams, Optset};
pub use ax_index::{FsParamsLoader, FsWorkdirs, JobIndex, MatchRequest, MethodHashSet, Workdir};
pub use serde_json::{json, Value};
pub use similar_asserts::assert_eq;
pub use std::path::{Path, PathBuf};
pub use tempfile::{tempdir, TempDir};

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::prelude::*;
use tower::ServiceExt;

pub type FsIndex = JobIndex<FsParamsLoader, FsWorkdirs>;

/// A job as the computation layer leaves it on disk.
pub struct JobSpec<'a> {
    pub id: &'a str,
    pub method: &'a str,
    pub hash: &'a str,
    pub starttime: f64,
    pub options: Value,
    pub subjobs: &'a [&'a str],
}

impl<'a> JobSpec<'a> {
    pub fn new(id: &'a str, method: &'a str, hash: &'a str, starttime: f64) -> Self {
        Self { id, method, hash, starttime, options: json!({}), subjobs: &[] }
    }

    pub fn options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    pub fn subjobs(mut self, subjobs: &'a [&'a str]) -> Self {
        self.subjobs = subjobs;
        self
    }

    /// Write `setup.json` and `post.json` under `workdir`.
    pub fn write(&self, workdir: &Path) {
        let dir = workdir.join(self.id);
        std::fs::create_dir_all(&dir).unwrap();
        let setup = json!({
            "jobid": self.id,
            "method": self.method,
            "hash": self.hash,
            "starttime": self.starttime,
            "exectime": {"total": 0.5},
            "params": {
                self.method: {"options": self.options, "datasets": {}, "jobs": {}}
            }
        });
        std::fs::write(dir.join("setup.json"), serde_json::to_vec_pretty(&setup).unwrap()).unwrap();
        let post = json!({"subjobs": self.subjobs});
        std::fs::write(dir.join("post.json"), serde_json::to_vec(&post).unwrap()).unwrap();
    }
}

/// Index reading jobs from one workdir on disk.
pub fn fs_index(workdir: &Workdir) -> FsIndex {
    JobIndex::new(FsParamsLoader::new([workdir]), FsWorkdirs)
}

pub fn rebuild(
    index: &mut FsIndex,
    workdir: &Workdir,
    hashes: &MethodHashSet,
) -> ax_index::RebuildReport {
    index.begin();
    index.observe(workdir).unwrap();
    index.finish(hashes).unwrap()
}

pub fn optset(entries: &[&str]) -> Optset {
    entries.iter().copied().collect()
}

pub fn basic_auth(user: &str, pass: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{user}:{pass}")))
}

pub async fn http_get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn http_add(router: &Router, auth: &str, record: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/add")
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, auth)
        .body(Body::from(serde_json::to_vec(record).unwrap()))
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
