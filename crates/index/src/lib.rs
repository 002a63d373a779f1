// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job result cache for the build orchestrator.
//!
//! Scans workdirs for completed jobs, memoizes their parameter records, and
//! compiles them into a per-method, newest-first index that answers exact and
//! subset match queries.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cache;
mod closure;
mod hashes;
mod index;
mod loader;

pub use cache::ParamsCache;
pub use closure::subjob_closure;
pub use hashes::MethodHashSet;
pub use index::{IndexError, JobIndex, MatchRequest, RebuildReport};
pub use loader::{
    FsParamsLoader, FsWorkdirs, LoadError, ParamsLoader, Workdir, WorkdirEnumerator,
    POST_FILE, SETUP_FILE,
};

#[cfg(any(test, feature = "test-support"))]
pub use loader::{FakeParamsLoader, FakeWorkdirs};
