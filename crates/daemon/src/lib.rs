// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Urd: the lineage daemon.
//!
//! Serves the lineage store over HTTP. Reads are open; writes need basic
//! auth from the user named in the record.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod auth;
pub mod env;
pub mod error;
pub mod lifecycle;
pub mod routes;

pub use auth::{parse_basic_auth_header, AuthError, AuthStore, PasswdError, PasswdLineError};
pub use env::Args;
pub use error::ApiError;
pub use lifecycle::{startup, Config, DaemonState, LifecycleError};
pub use routes::{router, AppState};
