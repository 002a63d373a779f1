// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lineage record timestamps.
//!
//! A timestamp is a calendar date `YYYYMMDD`, optionally followed by a space
//! and the time of day at hour, minute or second precision (`HH`, `HHMM`,
//! `HHMMSS`). Timestamps order lexically, which for this shape is also
//! chronological order with coarser precision sorting first.

use crate::lineage::ValidationError;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{8})(?: ([0-9]{2})([0-9]{2})?([0-9]{2})?)?$")
        .expect("constant regex pattern is valid")
});

/// Validated record timestamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Parse and validate a timestamp string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::Timestamp(s.to_string());
        let caps = TIMESTAMP.captures(s).ok_or_else(invalid)?;
        NaiveDate::parse_from_str(&caps[1], "%Y%m%d").map_err(|_| invalid())?;
        let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok()).unwrap_or(0);
        NaiveTime::from_hms_opt(part(2), part(3), part(4)).ok_or_else(invalid)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Timestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Timestamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Timestamp {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;
