// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lineage specs: the log on disk and the daemon's HTTP surface.

mod http;
mod log;
