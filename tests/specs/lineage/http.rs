// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon end to end: startup from a root directory, writes over HTTP,
//! and a restart that replays what was written.

use crate::prelude::*;
use crate::prelude::assert_eq;
use ax_urd::{router, startup, Config};
use axum::http::StatusCode;

fn root_with_users() -> (TempDir, Config) {
    let dir = tempdir().unwrap();
    let config = Config::at(dir.path());
    std::fs::write(&config.passwd_path, "# lineage writers\nalice:secret\nbob:hunter2\n").unwrap();
    (dir, config)
}

fn run(user: &str, automation: &str, timestamp: &str, deps: Value) -> Value {
    json!({
        "timestamp": timestamp,
        "joblist": [["csvimport", "dev-1"], ["dataset_sort", "dev-2"]],
        "caption": format!("{automation} at {timestamp}"),
        "user": user,
        "automation": automation,
        "deps": deps,
    })
}

#[tokio::test]
async fn writes_survive_a_restart() {
    let (_dir, config) = root_with_users();
    let prices = run("bob", "prices", "20240101", json!({}));
    let import = run(
        "alice",
        "import",
        "20240102",
        json!({"bob/prices": {
            "timestamp": "20240101",
            "joblist": prices["joblist"].clone(),
            "caption": prices["caption"].clone(),
        }}),
    );
    {
        let mut daemon = startup(&config).unwrap();
        let app = router(daemon.app_state());

        assert_eq!(
            http_add(&app, &basic_auth("bob", "hunter2"), &prices).await,
            (StatusCode::OK, json!("new"))
        );
        assert_eq!(
            http_add(&app, &basic_auth("alice", "secret"), &import).await,
            (StatusCode::OK, json!("new"))
        );
        daemon.shutdown();
    }

    let daemon = startup(&config).unwrap();
    let app = router(daemon.app_state());

    assert_eq!(http_get(&app, "/alice/import/latest").await, (StatusCode::OK, import.clone()));
    assert_eq!(http_get(&app, "/bob/prices/20240101").await, (StatusCode::OK, prices));
    assert_eq!(
        http_get(&app, "/alice/import/since/20240101").await,
        (StatusCode::OK, json!({"20240102": import}))
    );
    assert!(config.database_path.join("alice").join("import.urd").is_file());
}

#[tokio::test]
async fn only_the_record_owner_may_write() {
    let (_dir, config) = root_with_users();
    let daemon = startup(&config).unwrap();
    let app = router(daemon.app_state());
    let record = run("alice", "import", "20240101", json!({}));

    let (status, _) = http_add(&app, &basic_auth("bob", "hunter2"), &record).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = http_add(&app, &basic_auth("alice", "wrong"), &record).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(http_get(&app, "/alice/import/first").await, (StatusCode::OK, Value::Null));
}

#[tokio::test]
async fn invalid_records_are_rejected_before_touching_disk() {
    let (_dir, config) = root_with_users();
    let daemon = startup(&config).unwrap();
    let app = router(daemon.app_state());
    let mut record = run("alice", "import", "2024010", json!({}));

    let (status, _) = http_add(&app, &basic_auth("alice", "secret"), &record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    record["timestamp"] = json!("20240101");
    record["deps"] = json!({"x/y": {"timestamp": "20240101", "joblist": [], "caption": ""}});
    let (status, _) = http_add(&app, &basic_auth("alice", "secret"), &record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(!config.database_path.join("alice").exists());
}

#[tokio::test]
async fn second_daemon_on_the_same_root_is_refused() {
    let (_dir, config) = root_with_users();
    let _first = startup(&config).unwrap();

    assert!(matches!(startup(&config), Err(ax_urd::LifecycleError::LockFailed(_))));
}
