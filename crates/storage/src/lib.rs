// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only lineage logs with an in-memory mirror.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod store;

pub use codec::{encode_line, parse_line, ParseError, LOG_FORMAT_VERSION};
pub use store::{LineageStore, StoreError, LOG_EXTENSION};
