// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP routes over the lineage store.
//!
//! | Method | Path                                    | Auth  |
//! |--------|-----------------------------------------|-------|
//! | GET    | `/{user}/{automation}/since/{timestamp}` | none  |
//! | GET    | `/{user}/{automation}/latest`            | none  |
//! | GET    | `/{user}/{automation}/first`             | none  |
//! | GET    | `/{user}/{automation}/{timestamp}`       | none  |
//! | POST   | `/add`                                  | basic |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use ax_core::{AddStatus, LineageKey, LineageRecord, Timestamp};
use ax_storage::LineageStore;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::AuthStore;
use crate::error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LineageStore>,
    pub auth: Arc<AuthStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/add", post(add))
        .route("/{user}/{automation}/since/{timestamp}", get(since))
        .route("/{user}/{automation}/latest", get(latest))
        .route("/{user}/{automation}/first", get(first))
        .route("/{user}/{automation}/{timestamp}", get(single))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn since(
    State(state): State<AppState>,
    Path((user, automation, timestamp)): Path<(String, String, String)>,
) -> Result<Json<BTreeMap<Timestamp, LineageRecord>>, ApiError> {
    let key = LineageKey::new(&user, &automation)?;
    let timestamp = Timestamp::parse(&timestamp)?;
    Ok(Json(state.store.since(&key, &timestamp)))
}

async fn latest(
    State(state): State<AppState>,
    Path((user, automation)): Path<(String, String)>,
) -> Result<Json<Option<LineageRecord>>, ApiError> {
    let key = LineageKey::new(&user, &automation)?;
    Ok(Json(state.store.latest(&key)))
}

async fn first(
    State(state): State<AppState>,
    Path((user, automation)): Path<(String, String)>,
) -> Result<Json<Option<LineageRecord>>, ApiError> {
    let key = LineageKey::new(&user, &automation)?;
    Ok(Json(state.store.first(&key)))
}

async fn single(
    State(state): State<AppState>,
    Path((user, automation, timestamp)): Path<(String, String, String)>,
) -> Result<Json<Option<LineageRecord>>, ApiError> {
    let key = LineageKey::new(&user, &automation)?;
    let timestamp = Timestamp::parse(&timestamp)?;
    Ok(Json(state.store.get(&key, &timestamp)))
}

/// Credentials are checked before the body is looked at; the
/// authenticated user must be the record's user.
async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AddStatus>, ApiError> {
    let user = state.auth.authenticate(&headers)?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;
    let record_user = value.get("user").and_then(Value::as_str).unwrap_or_default();
    if record_user != user {
        return Err(ApiError::UserMismatch {
            authenticated: user,
            record: record_user.to_string(),
        });
    }

    let record = LineageRecord::from_json(value)?;
    debug!(key = %record.key(), timestamp = %record.timestamp, "add requested");

    let store = Arc::clone(&state.store);
    let status = tokio::task::spawn_blocking(move || store.add(record))
        .await
        .map_err(|e| ApiError::Internal(format!("add task failed: {e}")))??;
    Ok(Json(status))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
