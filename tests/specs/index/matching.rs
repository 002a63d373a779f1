// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exact and subset matching against a rebuilt index.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn setup() -> (TempDir, FsIndex) {
    let dir = tempdir().unwrap();
    let workdir = Workdir::new("dev", dir.path(), 2);
    JobSpec::new("dev-0", "csvimport", "c1", 10.0)
        .options(json!({"a": 1, "b": 2}))
        .write(dir.path());
    JobSpec::new("dev-1", "csvimport", "c1", 20.0)
        .options(json!({"a": 1, "b": 2, "c": 3}))
        .write(dir.path());
    JobSpec::new("dev-2", "csvimport", "c1", 5.0)
        .options(json!({"a": 1, "b": 2}))
        .write(dir.path());

    let mut index = fs_index(&workdir);
    rebuild(&mut index, &workdir, &MethodHashSet::new().with_hash("csvimport", "c1"));
    (dir, index)
}

const AB: &[&str] = &["csvimport:options:a=1", "csvimport:options:b=2"];

#[test]
fn exact_match_prefers_newest_equal_optset() {
    let (_dir, index) = setup();

    let hits: Vec<(u32, &str)> = index
        .match_exact([MatchRequest::new("csvimport", 1, optset(AB))])
        .map(|(id, job)| (id, job.id.as_str()))
        .collect();

    assert_eq!(hits, vec![(1, "dev-0")]);
}

#[test]
fn subset_match_accepts_extra_options() {
    let (_dir, index) = setup();

    let hits: Vec<(u32, &str)> = index
        .match_complex([MatchRequest::new("csvimport", 1, optset(AB))])
        .map(|(id, job)| (id, job.id.as_str()))
        .collect();

    assert_eq!(hits, vec![(1, "dev-1")]);
}

#[test]
fn one_answer_per_request_and_silent_misses() {
    let (_dir, index) = setup();
    let requests = vec![
        MatchRequest::new("csvimport", "ab", optset(AB)),
        MatchRequest::new("csvimport", "c=4", optset(&["csvimport:options:c=4"])),
        MatchRequest::new("csvimport", "c=3", optset(&["csvimport:options:c=3"])),
        MatchRequest::new("dataset_sort", "sort", optset(&[])),
    ];

    let hits: Vec<(&str, &str)> =
        index.match_complex(requests).map(|(id, job)| (id, job.id.as_str())).collect();

    assert_eq!(hits, vec![("ab", "dev-1"), ("c=3", "dev-1")]);
}

#[test]
fn defaults_let_old_jobs_match_new_options() {
    let dir = tempdir().unwrap();
    let workdir = Workdir::new("dev", dir.path(), 1);
    JobSpec::new("dev-0", "csvimport", "c1", 1.0).options(json!({"a": 1})).write(dir.path());
    let defaults: MethodParams =
        serde_json::from_value(json!({"options": {"a": 0, "strip": true}})).unwrap();
    let hashes = MethodHashSet::new().with_hash("csvimport", "c1").with_defaults("csvimport", defaults);
    let mut index = fs_index(&workdir);
    rebuild(&mut index, &workdir, &hashes);

    let wanted = optset(&["csvimport:options:a=1", "csvimport:options:strip=true"]);
    let hits: Vec<_> = index.match_exact([MatchRequest::new("csvimport", (), wanted)]).collect();

    assert_eq!(hits.len(), 1);
}
