// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Passphrase file and HTTP basic authentication.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    Missing,

    #[error("malformed authorization header: {0}")]
    Malformed(String),

    #[error("invalid credentials")]
    Invalid,
}

/// Errors loading the passphrase file.
#[derive(Debug, Error)]
pub enum PasswdError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: PasswdLineError,
    },
}

/// A passphrase file line that is not `user:passphrase`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: expected user:passphrase")]
pub struct PasswdLineError {
    /// 1-based line number
    pub line: usize,
}

/// Username to passphrase mapping.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    users: HashMap<String, String>,
}

impl AuthStore {
    /// Read a `user:passphrase` file. Blank lines and `#` comments are skipped.
    pub fn load(path: &Path) -> Result<Self, PasswdError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| PasswdError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&text).map_err(|source| PasswdError::Parse { path: path.to_path_buf(), source })
    }

    /// Parse passphrase file contents.
    pub fn parse(text: &str) -> Result<Self, PasswdLineError> {
        let mut users = HashMap::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(user), Some(pass), None) => {
                    users.insert(user.to_string(), pass.to_string());
                }
                _ => return Err(PasswdLineError { line: n + 1 }),
            }
        }
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn verify(&self, user: &str, passphrase: &str) -> bool {
        self.users.get(user).is_some_and(|p| p == passphrase)
    }

    /// Check the request's basic-auth credentials, returning the user.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let header = headers.get(AUTHORIZATION).ok_or(AuthError::Missing)?;
        let header = header
            .to_str()
            .map_err(|_| AuthError::Malformed("header is not ASCII".to_string()))?;
        let (user, passphrase) = parse_basic_auth_header(header)?;
        if self.verify(&user, &passphrase) {
            Ok(user)
        } else {
            Err(AuthError::Invalid)
        }
    }
}

/// Parse `Basic <base64(user:passphrase)>`.
pub fn parse_basic_auth_header(header: &str) -> Result<(String, String), AuthError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| AuthError::Malformed("expected Basic scheme".to_string()))?;
    let decoded = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::Malformed(format!("invalid base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| AuthError::Malformed(format!("invalid UTF-8: {e}")))?;
    let (user, passphrase) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::Malformed("expected user:passphrase".to_string()))?;
    Ok((user.to_string(), passphrase.to_string()))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
