// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ax-core: Shared domain types for the job cache and the Urd lineage store

pub mod clock;
pub mod id;
pub mod job;
pub mod lineage;
pub mod optset;
pub mod timestamp;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{format_write_time, Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use job::ParamsRecordBuilder;
pub use job::{ExecTime, Job, JobId, LoadedParams, MethodParams, ParamsRecord};
pub use lineage::{
    AddStatus, DepRecord, JobListEntry, LineageKey, LineageRecord, ValidationError,
};
pub use optset::Optset;
pub use timestamp::Timestamp;
