// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job index specs: rescans of real workdirs and cache lookups.

mod matching;
mod rescan;
