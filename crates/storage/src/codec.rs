// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log line format.
//!
//! One record per line, seven `|`-separated fields:
//!
//! ```text
//! version|write time|timestamp|user/automation|deps json|joblist json|caption
//! ```
//!
//! Fields are not escaped, so no field may contain `|` or a line break.

use ax_core::{
    format_write_time, DepRecord, JobListEntry, LineageKey, LineageRecord, Timestamp,
    ValidationError,
};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use thiserror::Error;

/// Only log format this store reads or writes
pub const LOG_FORMAT_VERSION: &str = "0";

const FIELD_COUNT: usize = 7;

/// Why a log line could not be read back.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),

    #[error("unsupported log format version {0:?}")]
    Version(String),

    #[error("invalid {field}: {source}")]
    Json {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn reject_pipe(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains('|') {
        return Err(ValidationError::Pipe { field, value: value.to_string() });
    }
    Ok(())
}

/// Render `record` as a log line (without the trailing newline).
pub fn encode_line(
    record: &LineageRecord,
    written_at: &NaiveDateTime,
) -> Result<String, ValidationError> {
    record.validate()?;
    let deps = serde_json::to_string(&record.deps)
        .map_err(|e| ValidationError::Shape(e.to_string()))?;
    let joblist = serde_json::to_string(&record.joblist)
        .map_err(|e| ValidationError::Shape(e.to_string()))?;

    reject_pipe("deps", &deps)?;
    reject_pipe("joblist", &joblist)?;
    reject_pipe("caption", &record.caption)?;
    reject_pipe("user", &record.user)?;
    reject_pipe("automation", &record.automation)?;
    reject_pipe("timestamp", record.timestamp.as_str())?;

    let written_at = format_write_time(written_at);
    let key = record.key().to_string();
    Ok([
        LOG_FORMAT_VERSION,
        written_at.as_str(),
        record.timestamp.as_str(),
        key.as_str(),
        deps.as_str(),
        joblist.as_str(),
        record.caption.as_str(),
    ]
    .join("|"))
}

/// Read a record back from a log line. The write time is not kept.
pub fn parse_line(line: &str) -> Result<LineageRecord, ParseError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let fields: Vec<&str> = line.split('|').collect();
    let &[version, _written_at, timestamp, key, deps, joblist, caption] = fields.as_slice() else {
        return Err(ParseError::FieldCount(fields.len()));
    };
    if version != LOG_FORMAT_VERSION {
        return Err(ParseError::Version(version.to_string()));
    }

    let key = LineageKey::parse(key)?;
    let deps: BTreeMap<String, DepRecord> = serde_json::from_str(deps)
        .map_err(|source| ParseError::Json { field: "deps", source })?;
    let joblist: Vec<JobListEntry> = serde_json::from_str(joblist)
        .map_err(|source| ParseError::Json { field: "joblist", source })?;

    let record = LineageRecord {
        timestamp: Timestamp::parse(timestamp)?,
        joblist,
        caption: caption.to_string(),
        user: key.user,
        automation: key.automation,
        deps,
    };
    record.validate()?;
    Ok(record)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
