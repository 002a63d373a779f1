// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The append-only log as other tools see it.

use crate::prelude::*;
use crate::prelude::assert_eq;
use ax_core::test_support::{dep_record, lineage_record, ts};
use ax_core::{AddStatus, FakeClock, LineageKey};
use ax_storage::{parse_line, LineageStore};

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn each_write_is_one_line_and_rereads_equal() {
    let dir = tempdir().unwrap();
    let store = LineageStore::open_with_clock(dir.path(), FakeClock::new()).unwrap();
    let mut record = lineage_record("alice", "import", "20240101 0930");
    record.deps.insert("bob/prices".into(), dep_record("20231231", &[("fetch", "dev-9")], "eod"));

    assert_eq!(store.add(record.clone()).unwrap(), AddStatus::New);
    assert_eq!(store.add(record.clone()).unwrap(), AddStatus::Unchanged);

    let path = dir.path().join("alice").join("import.urd");
    let lines = lines(&path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("0|20240101 120000|20240101 0930|alice/import|"));
    assert_eq!(parse_line(&lines[0]).unwrap(), record);
}

#[test]
fn update_appends_and_replay_keeps_the_last_line() {
    let dir = tempdir().unwrap();
    let key = LineageKey::new("alice", "import").unwrap();
    let original = lineage_record("alice", "import", "20240101");
    let mut revised = original.clone();
    revised.caption = "revised".into();
    {
        let store = LineageStore::open(dir.path()).unwrap();
        assert_eq!(store.add(original).unwrap(), AddStatus::New);
        assert_eq!(store.add(revised.clone()).unwrap(), AddStatus::Updated);
        assert_eq!(lines(&store.log_path(&key)).len(), 2);
    }

    let reopened = LineageStore::open(dir.path()).unwrap();

    assert_eq!(reopened.get(&key, &ts("20240101")), Some(revised.clone()));
    assert_eq!(reopened.latest(&key), Some(revised));
    assert_eq!(reopened.len(), 1);
}

#[test]
fn since_returns_strictly_later_entries() {
    let dir = tempdir().unwrap();
    let store = LineageStore::open(dir.path()).unwrap();
    for t in ["20240101", "20240102", "20240103"] {
        store.add(lineage_record("alice", "import", t)).unwrap();
    }
    let key = LineageKey::new("alice", "import").unwrap();

    let later: Vec<String> =
        store.since(&key, &ts("20240101")).keys().map(ToString::to_string).collect();

    assert_eq!(later, vec!["20240102", "20240103"]);
}

#[test]
fn hand_written_log_lines_are_replayed() {
    let dir = tempdir().unwrap();
    let user = dir.path().join("carol");
    std::fs::create_dir_all(&user).unwrap();
    std::fs::write(
        user.join("etl.urd"),
        "0|20240101 000000|20240101|carol/etl|{}|[[\"csvimport\",\"dev-1\"]]|first\n\
         0|20240102 000000|20240102 06|carol/etl|{}|[[\"csvimport\",\"dev-2\"]]|second\n",
    )
    .unwrap();

    let store = LineageStore::open(dir.path()).unwrap();
    let key = LineageKey::new("carol", "etl").unwrap();

    assert_eq!(store.first(&key).unwrap().caption, "first");
    assert_eq!(store.latest(&key).unwrap().caption, "second");
    assert_eq!(store.latest(&key).unwrap().joblist[0].1.as_str(), "dev-2");
}
