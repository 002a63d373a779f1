// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lineage records: timestamped snapshots of an automation's pipeline run.

use crate::job::JobId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while validating lineage records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),

    #[error("invalid record: {0}")]
    Shape(String),

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must not contain a path separator: {value:?}")]
    PathSeparator { field: &'static str, value: String },

    #[error("joblist of {0} must not be empty")]
    EmptyJoblist(String),

    #[error("{field} must not contain '|': {value:?}")]
    Pipe { field: &'static str, value: String },

    #[error("{field} must not contain a line break: {value:?}")]
    LineBreak { field: &'static str, value: String },

    #[error("invalid key {0:?}, expected user/automation")]
    Key(String),
}

/// One `(name, job_id)` step of a joblist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListEntry(pub String, pub JobId);

impl JobListEntry {
    pub fn new(name: impl Into<String>, job: impl Into<JobId>) -> Self {
        Self(name.into(), job.into())
    }
}

/// Dependency snapshot captured inside a record (no nested deps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepRecord {
    pub timestamp: Timestamp,
    pub joblist: Vec<JobListEntry>,
    pub caption: String,
}

/// One versioned entry of an automation's lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineageRecord {
    pub timestamp: Timestamp,
    pub joblist: Vec<JobListEntry>,
    pub caption: String,
    pub user: String,
    pub automation: String,
    pub deps: BTreeMap<String, DepRecord>,
}

impl LineageRecord {
    /// Decode and validate a record posted as JSON.
    ///
    /// The object must carry exactly the record fields; dependency values
    /// must carry exactly the dependency fields.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let record: LineageRecord =
            serde_json::from_value(value).map_err(|e| ValidationError::Shape(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_segment("user", &self.user)?;
        check_segment("automation", &self.automation)?;
        reject_line_break("caption", &self.caption)?;
        if self.joblist.is_empty() {
            return Err(ValidationError::EmptyJoblist(self.key().to_string()));
        }
        for (name, dep) in &self.deps {
            if dep.joblist.is_empty() {
                return Err(ValidationError::EmptyJoblist(format!("deps.{name}")));
            }
        }
        Ok(())
    }

    pub fn key(&self) -> LineageKey {
        LineageKey { user: self.user.clone(), automation: self.automation.clone() }
    }
}

/// Records are stored one per log line.
fn reject_line_break(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains(['\n', '\r']) {
        return Err(ValidationError::LineBreak { field, value: value.to_string() });
    }
    Ok(())
}

/// User and automation names become a directory and a file name.
fn check_segment(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    reject_line_break(field, value)?;
    if value.chars().any(|c| c == '/' || std::path::is_separator(c)) || value == "." || value == ".."
    {
        return Err(ValidationError::PathSeparator { field, value: value.to_string() });
    }
    Ok(())
}

/// `user/automation` key under which records are versioned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineageKey {
    pub user: String,
    pub automation: String,
}

impl LineageKey {
    pub fn new(user: &str, automation: &str) -> Result<Self, ValidationError> {
        check_segment("user", user)?;
        check_segment("automation", automation)?;
        Ok(Self { user: user.to_string(), automation: automation.to_string() })
    }

    /// Parse the `user/automation` form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let (user, automation) = s.split_once('/').ok_or_else(|| ValidationError::Key(s.into()))?;
        Self::new(user, automation).map_err(|_| ValidationError::Key(s.into()))
    }
}

impl fmt::Display for LineageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user, self.automation)
    }
}

/// Outcome of adding a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddStatus {
    /// No record existed at this key and timestamp
    New,
    /// A different record existed and was superseded
    Updated,
    /// An identical record already existed; nothing was written
    Unchanged,
}

impl fmt::Display for AddStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddStatus::New => "new",
            AddStatus::Updated => "updated",
            AddStatus::Unchanged => "unchanged",
        })
    }
}

#[cfg(test)]
#[path = "lineage_tests.rs"]
mod tests;
