// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rescanning workdirs on disk.

use crate::prelude::*;
use crate::prelude::assert_eq;

struct Dev {
    _dir: TempDir,
    path: PathBuf,
    workdir: Workdir,
}

fn dev() -> Dev {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dev");
    std::fs::create_dir_all(&path).unwrap();
    let workdir = Workdir::new("dev", &path, 4);
    Dev { _dir: dir, path, workdir }
}

fn hashes() -> MethodHashSet {
    MethodHashSet::new().with_hash("csvimport", "c1").with_hash("dataset_sort", "s1")
}

fn ids(index: &FsIndex, method: &str) -> Vec<String> {
    index.jobs_for(method).iter().map(|j| j.id.to_string()).collect()
}

#[test]
fn rescan_admits_valid_jobs_newest_first() {
    let dev = dev();
    for (id, t) in [("dev-0", 100.0), ("dev-1", 300.0), ("dev-2", 200.0)] {
        JobSpec::new(id, "csvimport", "c1", t).write(&dev.path);
    }
    let mut index = fs_index(&dev.workdir);

    let report = rebuild(&mut index, &dev.workdir, &hashes());

    assert_eq!(ids(&index, "csvimport"), vec!["dev-1", "dev-2", "dev-0"]);
    assert_eq!(report.observed, 3);
    assert_eq!(report.admitted, 3);
}

#[test]
fn changed_code_invalidates_job_and_its_dependants() {
    let dev = dev();
    JobSpec::new("dev-0", "csvimport", "c0", 1.0).write(&dev.path);
    JobSpec::new("dev-1", "dataset_sort", "s1", 2.0).subjobs(&["dev-0"]).write(&dev.path);
    JobSpec::new("dev-2", "csvimport", "c1", 3.0).write(&dev.path);
    let mut index = fs_index(&dev.workdir);

    let report = rebuild(&mut index, &dev.workdir, &hashes());

    assert_eq!(ids(&index, "csvimport"), vec!["dev-2"]);
    assert!(index.jobs_for("dataset_sort").is_empty());
    assert_eq!(report.discarded_hash, vec![JobId::new("dev-0")]);
    assert_eq!(report.discarded_subjobs, vec![JobId::new("dev-1")]);
}

#[test]
fn deleted_job_dirs_leave_the_cache() {
    let dev = dev();
    JobSpec::new("dev-0", "csvimport", "c1", 1.0).write(&dev.path);
    JobSpec::new("dev-1", "csvimport", "c1", 2.0).write(&dev.path);
    let mut index = fs_index(&dev.workdir);
    rebuild(&mut index, &dev.workdir, &hashes());

    std::fs::remove_dir_all(dev.path.join("dev-1")).unwrap();
    let report = rebuild(&mut index, &dev.workdir, &hashes());

    assert_eq!(report.evicted, vec![JobId::new("dev-1")]);
    assert!(!index.cache().contains(&JobId::new("dev-1")));
    assert_eq!(ids(&index, "csvimport"), vec!["dev-0"]);
}

#[test]
fn corrupt_setup_excludes_only_that_job() {
    let dev = dev();
    JobSpec::new("dev-0", "csvimport", "c1", 1.0).write(&dev.path);
    JobSpec::new("dev-1", "csvimport", "c1", 2.0).write(&dev.path);
    std::fs::write(dev.path.join("dev-1").join("setup.json"), b"{\"jobid\": ").unwrap();
    let mut index = fs_index(&dev.workdir);

    let report = rebuild(&mut index, &dev.workdir, &hashes());

    assert_eq!(ids(&index, "csvimport"), vec!["dev-0"]);
    assert_eq!(report.load_failures.len(), 1);
    assert_eq!(report.load_failures[0].0, JobId::new("dev-1"));
}

#[test]
fn unfinished_job_is_picked_up_once_it_finishes() {
    let dev = dev();
    JobSpec::new("dev-0", "csvimport", "c1", 1.0).write(&dev.path);
    std::fs::remove_file(dev.path.join("dev-0").join("post.json")).unwrap();
    let mut index = fs_index(&dev.workdir);

    rebuild(&mut index, &dev.workdir, &hashes());
    assert!(index.is_empty());

    JobSpec::new("dev-0", "csvimport", "c1", 1.0).write(&dev.path);
    rebuild(&mut index, &dev.workdir, &hashes());
    assert_eq!(ids(&index, "csvimport"), vec!["dev-0"]);
}

#[test]
fn freshly_computed_job_is_matchable_before_rescan() {
    let dev = dev();
    JobSpec::new("dev-0", "csvimport", "c1", 1.0).options(json!({"sep": ","})).write(&dev.path);
    let mut index = fs_index(&dev.workdir);
    rebuild(&mut index, &dev.workdir, &hashes());

    JobSpec::new("dev-1", "csvimport", "c1", 2.0).options(json!({"sep": ";"})).write(&dev.path);
    index.add_single(&JobId::new("dev-1")).unwrap();

    let wanted = optset(&["csvimport:options:sep=\";\""]);
    let hits: Vec<_> = index.match_exact([MatchRequest::new("csvimport", "req", wanted)]).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].1.id.as_str(), "dev-1");
}
