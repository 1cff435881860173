// ABOUTME: Conversation store selection parsed from DATABASE_URL
// ABOUTME: Distinguishes SQLite files, in-memory SQLite, and the process-local memory store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Default on-disk database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/lexdraft.db";

/// Type-safe store selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` database (single connection)
    SQLiteMemory,
    /// Process-local `HashMap` store, no SQL at all
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// `memory` selects the in-process store, `sqlite::memory:` an in-memory
    /// `SQLite` database, and `sqlite:<path>` or a bare path a database file.
    ///
    /// # Errors
    ///
    /// Returns a config error for empty or non-SQLite URLs
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AppError::config("DATABASE_URL must not be empty"));
        }
        if trimmed.eq_ignore_ascii_case("memory") {
            return Ok(Self::Memory);
        }
        if trimmed.contains("://") && !trimmed.starts_with("sqlite:") {
            return Err(AppError::config(format!(
                "Unsupported database URL scheme: {trimmed}"
            )));
        }

        let path = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
        let path = path.strip_prefix("//").unwrap_or(path);
        if path == ":memory:" {
            Ok(Self::SQLiteMemory)
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(path),
            })
        }
    }

    /// Load from `DATABASE_URL`, falling back to [`DEFAULT_DATABASE_URL`]
    ///
    /// # Errors
    ///
    /// Returns a config error if the variable holds an unsupported URL
    pub fn from_env() -> AppResult<Self> {
        Self::parse_url(&env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()))
    }

    /// Connection string for sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::SQLiteMemory => "sqlite::memory:".into(),
            Self::Memory => "memory".into(),
        }
    }

    /// Whether this selects the process-local store
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/lexdraft.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}
